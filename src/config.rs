use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::motion::MotionConfig;

/// How the internal framebuffer is stretched onto the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Filter {
    /// Blocky pixels.
    #[default]
    Nearest,
    /// Smoothed pixels.
    Bilinear,
}

/// Command-line options for the grid raycaster.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Internal render width in pixels (one ray per column).
    #[arg(long, default_value_t = 640, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,
    /// Internal render height in pixels.
    #[arg(long, default_value_t = 480, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,
    /// Initial window width in logical pixels.
    #[arg(long, default_value_t = 800.0, value_parser = parse_window_extent)]
    window_width: f64,
    /// Initial window height in logical pixels.
    #[arg(long, default_value_t = 600.0, value_parser = parse_window_extent)]
    window_height: f64,
    /// Walking speed in cells per second.
    #[arg(long, default_value_t = 5.0)]
    move_rate: f64,
    /// Turning speed in radians per second.
    #[arg(long, default_value_t = 3.0)]
    rot_rate: f64,
    /// Horizontal field of view in degrees. Defaults to the map's camera plane.
    #[arg(long, value_name = "DEGREES")]
    fov: Option<f64>,
    /// JSON map file. The built-in level is used when omitted.
    #[arg(long, value_name = "PATH")]
    map: Option<PathBuf>,
    /// Upscaling filter used when presenting.
    #[arg(long, value_enum, default_value_t = Filter::Nearest)]
    filter: Filter,
    /// Longest frame step fed to movement, in milliseconds.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..=1_000))]
    max_frame_ms: u64,
    /// Re-orthonormalize the camera after every frame.
    #[arg(long)]
    renormalize: bool,
    /// Print frames per second once a second.
    #[arg(long)]
    show_fps: bool,
}

/// Window extents must be finite and at least one logical pixel.
fn parse_window_extent(value: &str) -> Result<f64, String> {
    let extent: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !extent.is_finite() || extent < 1.0 {
        return Err(format!("`{value}` must be a finite size of at least 1"));
    }
    Ok(extent)
}

/// Everything the engine and host need, independent of the CLI.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub width: usize,
    pub height: usize,
    pub window_size: (f64, f64),
    pub motion: MotionConfig,
    pub fov_deg: Option<f64>,
    pub map: Option<PathBuf>,
    pub filter: Filter,
    pub max_dt: Duration,
    pub renormalize: bool,
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            window_size: (800.0, 600.0),
            motion: MotionConfig::default(),
            fov_deg: None,
            map: None,
            filter: Filter::Nearest,
            max_dt: Duration::from_millis(100),
            renormalize: false,
            show_fps: false,
        }
    }
}

impl From<Args> for Settings {
    fn from(args: Args) -> Self {
        Self {
            width: args.width as usize,
            height: args.height as usize,
            window_size: (args.window_width, args.window_height),
            motion: MotionConfig {
                move_rate: args.move_rate,
                rot_rate: args.rot_rate,
            },
            fov_deg: args.fov,
            map: args.map,
            filter: args.filter,
            max_dt: Duration::from_millis(args.max_frame_ms),
            renormalize: args.renormalize,
            show_fps: args.show_fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_settings_default() {
        let args = Args::try_parse_from(["gridcaster"]).unwrap();
        assert_eq!(Settings::from(args), Settings::default());
    }

    #[test]
    fn flags_are_carried_over() {
        let args = Args::try_parse_from([
            "gridcaster",
            "--width",
            "320",
            "--height",
            "200",
            "--fov",
            "90",
            "--filter",
            "bilinear",
            "--map",
            "level.json",
            "--renormalize",
        ])
        .unwrap();
        let settings = Settings::from(args);

        assert_eq!((settings.width, settings.height), (320, 200));
        assert_eq!(settings.fov_deg, Some(90.0));
        assert_eq!(settings.filter, Filter::Bilinear);
        assert_eq!(settings.map, Some(PathBuf::from("level.json")));
        assert!(settings.renormalize);
    }

    #[test]
    fn zero_viewport_is_refused_by_the_parser() {
        assert!(Args::try_parse_from(["gridcaster", "--width", "0"]).is_err());
        assert!(Args::try_parse_from(["gridcaster", "--height", "0"]).is_err());
    }

    #[test]
    fn window_size_must_be_positive_and_finite() {
        for bad in ["0", "-640", "0.5", "inf", "NaN", "wide"] {
            assert!(
                Args::try_parse_from(["gridcaster", "--window-width", bad]).is_err(),
                "width {bad} accepted"
            );
            assert!(
                Args::try_parse_from(["gridcaster", "--window-height", bad]).is_err(),
                "height {bad} accepted"
            );
        }
        let args =
            Args::try_parse_from(["gridcaster", "--window-width", "1024", "--window-height", "768"])
                .unwrap();
        assert_eq!(Settings::from(args).window_size, (1024.0, 768.0));
    }
}
