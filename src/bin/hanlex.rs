use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use hanlex::corpus::boundary_tags;
use hanlex::custom::Customization;
use hanlex::dict::Trie;
use hanlex::segmenter::Segmenter;
use hanlex::tagger::reconstruct;

#[derive(Parser)]
#[command(name = "hanlex", about = "Chinese lexical analysis diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment stdin lines with a frequency lexicon
    Segment {
        /// Frequency lexicon file (`word count` per line)
        lexicon: PathBuf,
        /// Customization dictionary applied to the output
        #[arg(long)]
        custom: Option<PathBuf>,
        /// Emit one JSON array per line instead of space-joined words
        #[arg(long)]
        json: bool,
    },

    /// Show dictionary matches for a text
    Match {
        /// Word list file (first whitespace field of each line)
        words: PathBuf,
        /// Text to scan
        text: String,
        /// Enumerate every match instead of longest non-overlapping
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    hanlex::trace_init::init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Segment {
            lexicon,
            custom,
            json,
        } => {
            let segmenter = Segmenter::from_file(&lexicon)?;
            let custom = match custom {
                Some(path) => Some(Customization::from_file(&path)?),
                None => None,
            };
            for line in io::stdin().lock().lines() {
                let words = segment_line(&segmenter, custom.as_ref(), &line?);
                if json {
                    println!("{}", serde_json::to_string(&words)?);
                } else {
                    println!("{}", words.join(" "));
                }
            }
        }
        Command::Match {
            words,
            text,
            all,
            json,
        } => {
            let trie = load_word_list(&words)?;
            let spans = if all {
                trie.all_matches(&text)
            } else {
                trie.longest_match(&text)
            };
            let chars: Vec<char> = text.chars().collect();
            for span in spans {
                let word: String = chars[span.start..span.end].iter().collect();
                if json {
                    println!(
                        "{}",
                        serde_json::json!({
                            "start": span.start,
                            "end": span.end,
                            "word": word,
                        })
                    );
                } else {
                    println!("{}\t{}\t{}", span.start, span.end, word);
                }
            }
        }
    }
    Ok(())
}

/// Dictionary segmentation, optionally corrected by the customization
/// layer via boundary tags.
fn segment_line(segmenter: &Segmenter, custom: Option<&Customization>, line: &str) -> Vec<String> {
    let words = segmenter.segment(line);
    let Some(custom) = custom else {
        return words;
    };
    let (chars, mut tags) = boundary_tags(&words);
    custom.apply(&chars, &mut tags);
    reconstruct(&chars, &tags).0
}

fn load_word_list(path: &Path) -> Result<Trie, io::Error> {
    let mut trie = Trie::new();
    for line in fs::read_to_string(path)?.lines() {
        if let Some(word) = line.split_whitespace().next() {
            trie.add_word(word);
        }
    }
    Ok(trie)
}
