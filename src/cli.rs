use clap::{CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;

use crate::keymap::Keymap;

#[derive(Parser, Debug)]
#[command(name = "gallery", about = "Browse a directory of images like a web gallery")]
pub struct Cli {
    /// Gallery directory (images in it or in its imgs/ subdirectory)
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Item list, one identifier per line relative to the image directory
    #[arg(short = 'L', long, value_name = "FILE")]
    pub file_list: Option<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Initial location, e.g. "n=4&zoom=fit&brightness=0.2"
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub query: String,

    /// Gallery title (defaults to the directory name)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Key binding table (TOML) replacing the built-in one
    #[arg(short, long, value_name = "FILE")]
    pub keys: Option<PathBuf>,

    /// Write thumbs/ for the gallery and exit
    #[arg(long)]
    pub make_thumbnails: bool,

    /// Longest side of generated thumbnails, in pixels
    #[arg(long, default_value = "300", value_name = "PX")]
    pub resolution: u32,
}

/// Described bindings grouped by context, for `--help`.
pub fn bindings_help(keymap: &Keymap) -> String {
    let mut out = String::from("Key bindings:\n");
    let mut context = None;
    for (ctx, keys, desc) in keymap.help_lines() {
        if context != Some(ctx) {
            out.push_str(&format!("\n  [{}]\n", ctx.name()));
            context = Some(ctx);
        }
        out.push_str(&format!("    {:<28} {}\n", keys, desc));
    }
    out
}

/// Parse the command line; `--help` lists the built-in bindings.
pub fn parse() -> Cli {
    let after_help = match Keymap::builtin() {
        Ok(keymap) => bindings_help(&keymap),
        Err(e) => {
            log::warn!("Built-in key bindings unavailable: {}", e);
            String::new()
        }
    };
    let matches = Cli::command().after_help(after_help).get_matches();
    match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["gallery"]).unwrap();
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.query, "");
        assert_eq!(cli.resolution, 300);
        assert!(!cli.recursive && !cli.make_thumbnails);
    }

    #[test]
    fn full_command_line() {
        let cli = Cli::try_parse_from([
            "gallery", "photos", "-r", "--query", "?n=3&zoom=fit", "--title", "Trip",
            "--make-thumbnails", "--resolution", "128",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("photos"));
        assert_eq!(cli.query, "?n=3&zoom=fit");
        assert_eq!(cli.title.as_deref(), Some("Trip"));
        assert_eq!(cli.resolution, 128);
        assert!(cli.recursive && cli.make_thumbnails);
    }

    #[test]
    fn help_lists_bindings_by_context() {
        let help = bindings_help(&Keymap::builtin().unwrap());
        assert!(help.contains("[Viewer]"));
        assert!(help.contains("[Item List]"));
        Cli::command().debug_assert();
    }
}
