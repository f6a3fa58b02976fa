use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand, ValueEnum};
use slice_viewer::{
    OutputFormat, Session, SessionError, SortBy, ViewerConfig, VolumeLoader, export::ExportError,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Render slices of DICOM and NIfTI volumes to PNG or JPEG
#[derive(Debug, Parser)]
#[command(version, about)]
struct App {
    /// Verbose mode
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the shape and slice range of a volume
    Info {
        /// DICOM file, DICOM series directory or NIfTI file
        input: PathBuf,
        /// Order of the files in a DICOM series
        #[arg(long, value_enum, default_value_t = SortArg::InstanceNumber)]
        sort: SortArg,
    },
    /// Render one slice with the given view parameters
    Render(RenderArgs),
}

#[derive(Debug, clap::Args)]
struct RenderArgs {
    /// DICOM file, DICOM series directory or NIfTI file
    input: PathBuf,
    /// Output image file
    #[arg(short = 'o', long = "output")]
    output: PathBuf,
    /// Slice index (defaults to the middle slice)
    #[arg(long)]
    slice: Option<usize>,
    /// Channel of a 4D volume
    #[arg(long, default_value_t = 0)]
    channel: usize,
    /// Contrast factor, clamped to [0.01, 3.0]
    #[arg(long, default_value_t = 1.0)]
    contrast: f32,
    /// Number of counter-clockwise quarter turns
    #[arg(long, default_value_t = 0)]
    rotate: u32,
    /// Mirror the image vertically
    #[arg(long)]
    flip: bool,
    /// Zoom factor, at least 1.0
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,
    /// Output format (inferred from the output extension when omitted)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,
    /// Order of the files in a DICOM series
    #[arg(long, value_enum, default_value_t = SortArg::InstanceNumber)]
    sort: SortArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    InstanceNumber,
    None,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::InstanceNumber => SortBy::InstanceNumber,
            SortArg::None => SortBy::None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpeg => OutputFormat::Jpeg,
        }
    }
}

fn main() -> ExitCode {
    let app = App::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if app.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    );

    let result = match app.command {
        Command::Info { input, sort } => print_info(input, sort.into()),
        Command::Render(args) => render(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_info(input: PathBuf, sort_by: SortBy) -> Result<(), SessionError> {
    let volume = VolumeLoader::load(&input, sort_by)?;
    println!("rank:          {}", volume.rank());
    println!("shape:         {:?}", volume.dim());
    println!("slices:        0..={}", volume.slice_count().saturating_sub(1));
    println!("channels:      {}", volume.channel_count());
    println!("default slice: {}", volume.default_slice_index());
    Ok(())
}

fn render(args: RenderArgs) -> Result<(), SessionError> {
    let config = ViewerConfig {
        sort_by: args.sort.into(),
        ..ViewerConfig::default()
    };
    let format = output_format(args.format, &args.output)?;

    let mut session = Session::open(&args.input, config)?;
    if let Some(index) = args.slice {
        session.change_slice(index)?;
    }
    if args.channel != 0 {
        session.change_channel(args.channel)?;
    }
    session.set_contrast(args.contrast)?;
    for _ in 0..args.rotate % 4 {
        session.rotate_step()?;
    }
    if args.flip {
        session.flip_toggle()?;
    }
    session.set_zoom(args.zoom)?;

    session.save(&args.output, format)?;
    info!(
        slice = session.slice_index(),
        slices = session.slice_count(),
        "Rendered {}",
        args.output.display()
    );
    Ok(())
}

/// The requested format, or the one named by the output extension.
fn output_format(format: Option<FormatArg>, output: &Path) -> Result<OutputFormat, ExportError> {
    match format {
        Some(format) => Ok(format.into()),
        None => OutputFormat::from_path(output)
            .ok_or_else(|| ExportError::UnsupportedExtension(output.to_path_buf())),
    }
}
