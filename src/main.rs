//! Writes a directory of random expression test cases.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use log::info;
use polygen::{Config, Corpus};
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "polygen")]
#[command(about = "Generate random expression test cases for a judge", long_about = None)]
struct Cli {
    /// Preset name (poly, recursive, full) or path to a TOML profile
    #[arg(long, default_value = "full")]
    preset: String,

    /// Number of test cases to generate
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Maximum nesting depth of expansive factors
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Expected number of terms in a top-level expression
    #[arg(long)]
    expr_length: Option<u32>,

    /// Expected number of factors in a top-level term
    #[arg(long)]
    term_length: Option<u32>,

    /// Random seed for reproducibility (default: derived from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Digits in the zero-padded file index
    #[arg(long, default_value_t = 4)]
    width: usize,

    /// File extension
    #[arg(long, default_value = "in")]
    extension: String,

    /// Ask for the parameters on stdin
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.preset)?;
    if let Some(count) = cli.count {
        config.testcases = count;
    }
    if let Some(depth) = cli.max_depth {
        config.max_depth = depth;
    }
    if let Some(len) = cli.expr_length {
        config.expr_length = len;
    }
    if let Some(len) = cli.term_length {
        config.term_length = len;
    }
    if cli.interactive {
        let stdin = io::stdin();
        let mut prompt = Prompt {
            input: stdin.lock(),
            output: io::stdout(),
        };
        prompt.configure(&mut config)?;
    }

    let seed = cli.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    info!("seed {}", seed);
    let rng = rand::rngs::StdRng::seed_from_u64(seed);

    let corpus = Corpus::new(&cli.output)
        .width(cli.width)
        .extension(cli.extension);
    let written = corpus.write(&config, rng)?;

    println!("polygen: generated {} test cases", written.len());
    println!("  seed:   {seed}");
    println!("  preset: {}", cli.preset);
    println!("  depth:  {}", config.max_depth);
    println!("  output: {}", corpus.dir().display());
    Ok(())
}

/// Line-oriented questions on a terminal.
struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    fn configure(&mut self, config: &mut Config) -> Result<()> {
        config.testcases = self.number("the number of testcases you want to generate")?;
        config.max_depth = self.number("the maximum value of the depth")?;
        if !self.yes("Do you want to have other customized settings?(y/n)")? {
            return Ok(());
        }
        config.expr_length = self.number("the expected length of the expression")?;
        config.term_length = self.number("the expected length of the term")?;
        let w = &mut config.weights;
        w.positive_sign = self.number("the percentage of positive sign")?;
        w.pow = self.number("the percentage of pow")?;
        w.signed_integer = self.number("the percentage of signed integer")?;
        w.expression = self.number("the percentage of expression")?;
        w.trig = self.number("the percentage of triFunction")?;
        w.function = self.number("the percentage of function")?;
        w.derivative = self.number("the percentage of derivation")?;
        w.expr_exponent = self.number("the percentage of expr_pow")?;
        Ok(())
    }

    fn line(&mut self, question: &str) -> Result<String> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("unexpected end of input");
        }
        Ok(line.trim().to_string())
    }

    fn number(&mut self, what: &str) -> Result<u32> {
        let answer = self.line(&format!("Please input {}:", what))?;
        answer
            .parse()
            .with_context(|| format!("not a number: {:?}", answer))
    }

    fn yes(&mut self, question: &str) -> Result<bool> {
        let answer = self.line(question)?;
        Ok(answer.starts_with(['y', 'Y']))
    }
}
