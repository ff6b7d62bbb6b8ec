use clap::Parser;

use crate::{infrastructure::config::CounterConfig, utils::version};

#[derive(Parser, Debug, Default)]
#[command(author, version = version(), about)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "MILLIS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Milliseconds between ticks"
    )]
    pub tick_rate_ms: Option<u64>,

    #[arg(
        short,
        long,
        value_name = "COUNT",
        help = "Stop after this many ticks (0 runs until Ctrl-C)"
    )]
    pub max_ticks: Option<u64>,

    #[arg(short, long, value_name = "N", allow_negative_numbers = true, help = "Amount added per tick")]
    pub step: Option<i64>,
}

impl Cli {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, counter: &CounterConfig) -> CounterConfig {
        CounterConfig {
            tick_rate_ms: self.tick_rate_ms.unwrap_or(counter.tick_rate_ms),
            max_ticks: self.max_ticks.unwrap_or(counter.max_ticks),
            step: self.step.unwrap_or(counter.step),
        }
    }
}
