//! Command-line argument parsing.

use clap::Parser;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "custom-platforms")]
#[command(about = "Audio-reactive platform material feed", long_about = None)]
pub struct Args {
    /// Number of render frames to run
    #[arg(long, value_name = "FRAMES", default_value = "600")]
    pub frames: u64,

    /// Shader array uniform receiving the 64 spectrum samples
    #[arg(long, value_name = "NAME", default_value = "_SpectrumData")]
    pub array_uniform: String,

    /// Shader scalar uniform receiving the mean intensity
    #[arg(long, value_name = "NAME", default_value = "_SpectrumAverage")]
    pub average_uniform: String,

    /// Number of materials on the demo platform renderer
    #[arg(long, value_name = "COUNT", default_value = "2")]
    pub materials: usize,

    /// Change the load-custom-scripts setting (triggers a platform reload)
    #[arg(long, value_name = "BOOL")]
    pub load_custom_scripts: Option<bool>,

    /// Change the show-heart setting
    #[arg(long, value_name = "BOOL")]
    pub show_heart: Option<bool>,

    /// Change the always-show-feet setting
    #[arg(long, value_name = "BOOL")]
    pub always_show_feet: Option<bool>,

    /// Change the use-in-360 setting
    #[arg(long, value_name = "BOOL")]
    pub use_in_360: Option<bool>,

    /// Change the use-in-multiplayer setting
    #[arg(long, value_name = "BOOL")]
    pub use_in_multiplayer: Option<bool>,
}
