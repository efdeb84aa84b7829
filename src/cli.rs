use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_THUMBNAIL_SIZE: f64 = 256.0;

#[derive(Debug, Parser)]
#[command(
    name = "verid-thumbnailer",
    about = "Render a thumbnail for a Ver-ID registration export (.verid / .zip)",
    version
)]
pub struct Cli {
    /// Registration export to read (.verid, .registration or .zip)
    pub input: PathBuf,

    /// Where to write the PNG thumbnail
    pub output: PathBuf,

    /// Square thumbnail size in points
    #[arg(short, long, default_value_t = DEFAULT_THUMBNAIL_SIZE)]
    pub size: f64,

    /// Thumbnail width in points (overrides --size)
    #[arg(long)]
    pub width: Option<f64>,

    /// Thumbnail height in points (overrides --size)
    #[arg(long)]
    pub height: Option<f64>,

    /// Pixels per point of the destination
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,

    /// Resampling quality: quality, balanced or speed
    #[arg(long)]
    pub quality: Option<String>,

    /// JSON settings file with limit overrides
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (may be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn maximum_size(&self) -> (f64, f64) {
        (
            self.width.unwrap_or(self.size),
            self.height.unwrap_or(self.size),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freedesktop_style_invocation() {
        let cli = Cli::try_parse_from(["verid-thumbnailer", "-s", "128", "in.verid", "out.png"])
            .expect("parse");

        assert_eq!(cli.input, PathBuf::from("in.verid"));
        assert_eq!(cli.output, PathBuf::from("out.png"));
        assert_eq!(cli.maximum_size(), (128.0, 128.0));
        assert_eq!(cli.scale, 1.0);
    }

    #[test]
    fn explicit_width_and_height_override_size() {
        let cli = Cli::try_parse_from([
            "verid-thumbnailer",
            "--width",
            "160",
            "--height",
            "90",
            "--scale",
            "2",
            "-vv",
            "export.zip",
            "out.png",
        ])
        .expect("parse");

        assert_eq!(cli.maximum_size(), (160.0, 90.0));
        assert_eq!(cli.scale, 2.0);
        assert_eq!(cli.verbose, 2);
    }
}
