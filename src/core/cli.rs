use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "upswatch")]
#[command(about = "Watch a NUT UPS and send an email when its status changes", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "/etc/upswatch.conf")]
    pub config: PathBuf,

    /// UPS name to watch (overrides the config file)
    #[arg(short, long, value_name = "NAME")]
    pub ups: Option<String>,

    /// Enable verbose (debug) output
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}
