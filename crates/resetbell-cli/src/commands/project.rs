use clap::Args;

use resetbell_core::clock::{CalendarClock, SystemClock};
use resetbell_core::cycle;
use resetbell_core::{project_fulfillment, RewardTarget};

#[derive(Args)]
pub struct ProjectArgs {
    /// Required resource amount
    #[arg(long)]
    required: u32,
    /// Currently held amount
    #[arg(long, default_value = "0")]
    current: u32,
    /// Amount granted at each weekly reset
    #[arg(long, default_value = "315")]
    weekly: u32,
    /// Amount granted once per weekend window
    #[arg(long, default_value = "15")]
    weekend: u32,
    /// Whether this cycle's weekend grant was already claimed.
    /// Omitted: assumed claimed when "now" is inside the window.
    #[arg(long)]
    claimed: Option<bool>,
}

pub fn run(args: ProjectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = SystemClock.now();
    let claimed = args
        .claimed
        .unwrap_or_else(|| cycle::is_within_weekend_window(now));
    let target = RewardTarget {
        required_amount: args.required,
        current_amount: args.current,
        weekly_grant: args.weekly,
        weekend_grant: args.weekend,
        weekend_claimed: claimed,
    };

    let fulfilled_at = project_fulfillment(&target, now)?;
    if target.current_amount >= target.required_amount {
        println!("target already met ({} / {})", args.current, args.required);
    } else if fulfilled_at <= now {
        // Fulfilled by the weekend grant of the window we are already in.
        println!(
            "claimable in the current weekend window (opened {})",
            fulfilled_at.format("%Y-%m-%d %H:%M")
        );
    } else {
        println!("fulfillment date: {}", fulfilled_at.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}
