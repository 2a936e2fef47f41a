use colored::Colorize;

use super::lows::{NewLowEvent, OptionType};
use super::selection::CandidateResult;

pub fn banner(title: &str) {
    println!("{}", "=".repeat(70).blue());
    println!("{}", title.green().bold());
    println!("{}", "=".repeat(70).blue());
}

/// Near-target lows get a full banner, everything else a single line
pub fn new_low(event: &NewLowEvent, target: f64) {
    if event.near_target {
        println!();
        println!("{}", "=".repeat(60).yellow());
        println!("{} {}", "🔔".to_string(), format!("NEW LOW NEAR ₹{:.0}!", target).yellow().bold());
        println!("   Strike: {}", event.key.to_string().yellow());
        println!(
            "   Old Low: ₹{:.2} → New Low: ₹{:.2} (↓{:.2}%)",
            event.old_low, event.new_low, event.drop_percent
        );
        println!("   Distance from ₹{:.0}: ₹{:.2}", target, event.distance);
        println!("   Time: {}", event.time.format("%H:%M:%S"));
        println!("{}", "=".repeat(60).yellow());
        println!();
    } else {
        println!(
            "{} NEW LOW: {} - ₹{:.2} → ₹{:.2}",
            "📉".to_string(),
            event.key.to_string().cyan(),
            event.old_low,
            event.new_low
        );
    }
}

fn side_marker(option_type: OptionType) -> &'static str {
    match option_type {
        OptionType::Call => "📈",
        OptionType::Put => "📉",
    }
}

/// One line per side for the per-cycle status
pub fn status(result: &CandidateResult) {
    for option_type in OptionType::ALL {
        if let Some(s) = result.side(option_type) {
            println!(
                "   {} {}: Strike {} - LOW: ₹{:.2} (Current: ₹{:.2}) - Distance: ₹{:.2}",
                side_marker(option_type),
                option_type,
                s.strike.to_string().yellow(),
                s.low,
                s.current_price,
                s.distance
            );
        }
    }
    println!();
}

/// Multi-line block per side for final summaries
pub fn summary(title: &str, result: &CandidateResult, target: f64) {
    println!();
    banner(title);
    if result.is_empty() {
        println!("{} No instruments observed", "ℹ".blue());
    }
    for option_type in OptionType::ALL {
        if let Some(s) = result.side(option_type) {
            println!("{} {}: Strike {}", side_marker(option_type), option_type, s.strike.to_string().yellow());
            println!("   LOW: ₹{:.2}", s.low);
            println!("   Current LTP: ₹{:.2}", s.current_price);
            println!("   Distance from ₹{:.0}: ₹{:.2}", target, s.distance);
            println!("   Samples: {}", s.sample_count);
        }
    }
    println!("{}", "=".repeat(70).blue());
}
