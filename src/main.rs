// Command-line entry point for AST Forge.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use ast_forge::application::GenerateUsecase;
use ast_forge::config::GeneratorConfig;
use ast_forge::infrastructure::logging::init_tracing;
use ast_forge::infrastructure::StagedFileWriter;
use ast_forge::GrammarError;

// sysexits(3)
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_IOERR: u8 = 74;

const USAGE: &str = "Usage: generate_ast <output directory>";

#[derive(Parser, Debug)]
#[command(name = "generate_ast", author, version, about, long_about = None)]
struct Cli {
    /// Directory the generated modules are written into
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            eprintln!("{}", USAGE);
            return ExitCode::from(EX_USAGE);
        }
    };

    init_tracing();

    let config = GeneratorConfig::from_env();
    let source = config.grammar_source();
    let usecase = GenerateUsecase {
        source: &source,
        writer: &StagedFileWriter,
    };

    match usecase.run(&cli.output_dir) {
        Ok(report) => {
            tracing::info!(
                "generated {} nodes in {} families from `{}` into {}",
                report.nodes,
                report.families,
                report.grammar,
                cli.output_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let grammar_fault = e.chain().any(|cause| cause.is::<GrammarError>());
            ExitCode::from(if grammar_fault { EX_DATAERR } else { EX_IOERR })
        }
    }
}
