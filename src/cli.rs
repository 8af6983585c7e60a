use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(version, about = "Photo culling tool for JPEG+RAW shoots", long_about = None)]
pub struct CliArgs {
    /// Directory of .jpg images to open on startup
    pub directory: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directory_and_verbose() {
        let args = CliArgs::try_parse_from(["sift", "/photos/shoot-01", "-v"]).unwrap();
        assert_eq!(args.directory, Some(PathBuf::from("/photos/shoot-01")));
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_no_args() {
        let args = CliArgs::try_parse_from(["sift"]).unwrap();
        assert_eq!(args.directory, None);
        assert!(!args.verbose);
    }
}
