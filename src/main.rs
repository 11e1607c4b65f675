//! CLI for docxkit - DOCX image stripping and Markdown conversion.

use clap::{Parser, Subcommand};
use docxkit::{
    ConvertOptions, DocxImageStripper, DocxToMarkdown, ImageHandling, OrphanPolicy, StripOptions,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Remove every embedded image from a DOCX file
    Strip {
        /// Input DOCX file path
        input: PathBuf,

        /// Output DOCX file path (defaults to noimages_<input> next to the input)
        output: Option<PathBuf>,

        /// Fail on markup references to missing relationship ids
        #[arg(long)]
        strict: bool,
    },
    /// Convert a DOCX file to Markdown
    Markdown {
        /// Input DOCX file path
        input: PathBuf,

        /// Output Markdown file path (optional, prints to stdout if not specified)
        output: Option<PathBuf>,

        /// Directory to extract images to (if not set, images are embedded inline)
        #[arg(long)]
        images_dir: Option<PathBuf>,

        /// Skip extracting images
        #[arg(long)]
        skip_images: bool,
    },
}

fn main() {
    let args = Args::parse();

    match args.command {
        Command::Strip {
            input,
            output,
            strict,
        } => {
            let options = StripOptions {
                orphan_policy: if strict {
                    OrphanPolicy::Strict
                } else {
                    OrphanPolicy::Lenient
                },
            };
            let stripper = DocxImageStripper::new(options);
            let result = match output {
                Some(output) => stripper.strip_to(&input, output),
                None => stripper.strip(&input),
            };
            match result {
                Ok(outcome) => {
                    println!(
                        "Removed {} drawing nodes, {} image relationships, {} media entries",
                        outcome.report.drawing_nodes,
                        outcome.report.image_relationships,
                        outcome.report.media_entries
                    );
                    println!("Output written to {:?}", outcome.output_path);
                }
                Err(e) => {
                    eprintln!("Error stripping images: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Markdown {
            input,
            output,
            images_dir,
            skip_images,
        } => {
            let image_handling = if skip_images {
                ImageHandling::Skip
            } else if let Some(dir) = images_dir {
                ImageHandling::SaveToDir(dir)
            } else {
                ImageHandling::Inline
            };

            let converter = DocxToMarkdown::new(ConvertOptions { image_handling });

            match converter.convert(&input) {
                Ok(markdown) => {
                    if let Some(output) = output {
                        if let Err(e) = std::fs::write(&output, &markdown) {
                            eprintln!("Error writing output: {}", e);
                            std::process::exit(1);
                        }
                        println!("Successfully converted to {:?}", output);
                    } else {
                        println!("{}", markdown);
                    }
                }
                Err(e) => {
                    eprintln!("Error converting DOCX: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
