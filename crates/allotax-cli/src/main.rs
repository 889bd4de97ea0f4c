use allotax::{
    Alpha, ChartConfig, ChartRequest, PdfOutcome, PdfStrategy, ProcessRenderer, generate_chart,
};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Allotax(allotax::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Allotax(err) => write!(f, "{err}"),
        }
    }
}

impl From<allotax::Error> for CliError {
    fn from(value: allotax::Error) -> Self {
        Self::Allotax(value)
    }
}

#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    pdf: Option<String>,
    node: Option<OsString>,
    renderer: Option<PathBuf>,
}

fn usage() -> &'static str {
    "allotax\n\
\n\
USAGE:\n\
  allotax [--pdf chromium|wkhtmltopdf|svg2pdf|none] [--node <path>] [--renderer <script>] <dataset1> <dataset2> <output> <alpha> [<title1> [<title2>]]\n\
\n\
NOTES:\n\
  - Datasets are JSON (a list of records, or an object with a `data` list), optionally wrapped as `export const data = ...;`.\n\
  - <alpha> is the rank-turbulence divergence parameter: a non-negative number or `inf`.\n\
  - An <output> ending in .pdf writes the HTML next to it; otherwise the PDF lands next to the HTML.\n\
  - Titles default to the dataset file names.\n\
  - chromium prints the page as-is (A3 landscape); svg2pdf stacks the chart's SVG panels onto one page and drops HTML-only content.\n\
\n\
ENVIRONMENT:\n\
  ALLOTAX_NODE       Node.js binary (default: node)\n\
  ALLOTAX_RENDERER   renderer script (default: tools/allotaxonometer/render.mjs)\n\
  ALLOTAX_PDF        PDF strategy (default: chromium)\n\
  ALLOTAX_CHROMIUM   Chromium binary for the chromium strategy (default: chromium)\n\
  ALLOTAX_LOG        log filter, e.g. `debug` (default: warn)\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pdf" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.pdf = Some(name.clone());
            }
            "--node" => {
                let Some(node) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.node = Some(OsString::from(node));
            }
            "--renderer" => {
                let Some(script) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.renderer = Some(PathBuf::from(script));
            }
            "--" => args.positional.extend(it.by_ref().cloned()),
            other if other.starts_with("--") => return Err(CliError::Usage(usage())),
            value => args.positional.push(value.to_string()),
        }
    }

    if !(4..=6).contains(&args.positional.len()) {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn run(args: Args) -> Result<(), CliError> {
    let mut config = ChartConfig::from_env();
    if let Some(node) = args.node {
        config.node = node;
    }
    if let Some(script) = args.renderer {
        config.renderer_script = script;
    }
    if let Some(pdf) = args.pdf {
        config.pdf_strategy = pdf;
    }

    let mut positional = args.positional.into_iter();
    let (Some(dataset1), Some(dataset2), Some(output), Some(alpha)) = (
        positional.next(),
        positional.next(),
        positional.next(),
        positional.next(),
    ) else {
        return Err(CliError::Usage(usage()));
    };
    let request = ChartRequest {
        dataset1: PathBuf::from(dataset1),
        dataset2: PathBuf::from(dataset2),
        output: PathBuf::from(output),
        alpha: alpha.parse::<Alpha>()?,
        title1: positional.next(),
        title2: positional.next(),
    };

    let strategy = match PdfStrategy::from_name(&config.pdf_strategy) {
        Some(strategy) => strategy,
        None => {
            let known: Vec<_> = PdfStrategy::ALL.iter().map(|s| s.name()).collect();
            eprintln!(
                "Invalid PDF strategy `{}` (expected one of: {}); skipping PDF conversion.",
                config.pdf_strategy,
                known.join(", ")
            );
            PdfStrategy::None
        }
    };

    let renderer = ProcessRenderer::node(config.node.clone(), config.renderer_script.clone());
    let outcome = generate_chart(&request, &renderer, strategy)?;

    println!("HTML saved to {}", outcome.html.display());
    match outcome.pdf {
        PdfOutcome::Written(path) => {
            println!("PDF conversion complete using {strategy}: {}", path.display())
        }
        PdfOutcome::Skipped => {}
        PdfOutcome::Failed(err) => eprintln!("{err}"),
    }
    Ok(())
}

fn main() {
    allotax::logging::init("warn");

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(CliError::Allotax(err)) => {
            match &err {
                allotax::Error::RenderFailed { stderr, .. } => {
                    eprintln!("Error: {}", stderr.trim_end())
                }
                other => eprintln!("{other}"),
            }
            std::process::exit(err.exit_code());
        }
    }
}
