// Discord commands module.
// Each command group gets its own file; shared reply plumbing lives next to them.

pub mod command_table;
pub mod eval;
pub mod help;
pub mod migration;
pub mod misc;
pub mod owner;

// Helpers shared by the command files
pub mod dispatch;
pub mod paginator;
pub mod presence;
pub mod replies;

use crate::discord::{Data, Error};

/// Every command the framework registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        help::help(),
        misc::ping(),
        misc::license(),
        misc::feedback(),
        misc::about(),
        misc::status(),
        misc::news(),
        misc::patch(),
        misc::leaderboard(),
        owner::clr(),
        owner::load(),
        owner::unload(),
        owner::reload(),
        owner::shutdown(),
        owner::runas(),
        owner::speedtest(),
        owner::sql(),
        owner::admin(),
        owner::awards(),
        eval::exc(),
        command_table::cmd(),
        migration::insert_guild(),
        migration::insert_profiles(),
        migration::insert_prefixes(),
    ]
}
