use std::env;
use std::path::Path;
use std::process::ExitCode;

use holdem_sim::evaluator::RoyalRule;
use holdem_sim::game::{Game, GameConfig};
use holdem_sim::policy::ThresholdPolicy;
use holdem_sim::regression::{self, CaseOutcome};

fn usage() -> ExitCode {
    eprintln!(
        "usage:\n  holdem demo [seed] [matches]   run an all-bot session\n  holdem regress <dir>           replay recorded showdowns\nVersion: {}",
        holdem_sim::VERSION
    );
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("demo") => {
            let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(42);
            let matches = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
            demo(seed, matches)
        }
        Some("regress") => match args.get(1) {
            Some(dir) => regress(Path::new(dir)),
            None => usage(),
        },
        Some(_) => usage(),
    }
}

fn demo(seed: u64, matches: u32) -> ExitCode {
    let mut game = Game::new(GameConfig::default(), seed);
    for id in ["alice", "bob", "carol", "dave"] {
        game.add_seat(id, Box::new(ThresholdPolicy::default()));
    }

    for n in 1..=matches {
        if game.active_seats() < 2 {
            println!("session over: one stack left");
            break;
        }
        let result = match game.play_match() {
            Ok(result) => result,
            Err(err) => {
                eprintln!("match {n} failed: {err}");
                return ExitCode::FAILURE;
            }
        };
        if result.winners.is_empty() {
            println!("match {n}: everyone folded, pot refunded");
        } else {
            println!("match {n}: winners {}", result.winners.join(", "));
        }
        for standing in game.current_standings() {
            let hand = standing
                .category
                .map(|c| c.label().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {:8} stack {:4}  {}", standing.id, standing.stack, hand);
        }
    }
    ExitCode::SUCCESS
}

fn regress(dir: &Path) -> ExitCode {
    let report = match regression::run_directory(dir, RoyalRule::default()) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("regression run failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    for case in &report.cases {
        match &case.outcome {
            CaseOutcome::Pass => println!("PASS {}", case.file),
            CaseOutcome::Fail { winners } => {
                println!("FAIL {} (selected: {})", case.file, winners.join(", "))
            }
            CaseOutcome::Invalid { reason } => println!("SKIP {} ({reason})", case.file),
        }
    }
    println!(
        "{} passed, {} failed, {} invalid of {}",
        report.passed(),
        report.failed(),
        report.invalid(),
        report.cases.len()
    );
    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
