use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;

use datamatch::{Registry, VariantType};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Declare a variant shape, e.g. 'Cons($1, $2)' or 'Empty'
    #[arg(short, long = "shape", value_name = "TEMPLATE")]
    shapes: Vec<String>,

    /// Ground term to match, e.g. 'Cons(=1, Empty)'
    #[arg(short = 'S', long, value_name = "TERM")]
    subject: Option<String>,

    /// Patterns, tried in order
    #[arg(value_name = "PATTERN", required = true)]
    patterns: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let registry = declare_shapes(&args.shapes)?;

    let Some(term) = args.subject.as_deref() else {
        for text in &args.patterns {
            println!("{}", registry.parse(text)?);
        }
        return Ok(());
    };

    let subject = registry
        .parse(term)
        .and_then(|ast| registry.instantiate(&ast))
        .with_context(|| format!("building subject {term}"))?;
    let handlers = args
        .patterns
        .iter()
        .enumerate()
        .map(|(index, text)| registry.pattern(text, move |bindings| Ok((index, bindings))))
        .collect::<Result<Vec<_>, _>>()?;

    let (index, bindings) = registry.dispatch(&subject, &handlers)?;
    println!("{subject} matched {}", handlers[index].pattern());
    for (name, value) in bindings.iter().sorted_by_key(|(name, _)| *name) {
        println!("  {name} = {value}");
    }
    Ok(())
}

/// Logging is off unless `RUST_LOG` is set, e.g. `RUST_LOG=datamatch=trace`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn declare_shapes(templates: &[String]) -> Result<Registry> {
    let mut registry = Registry::new();
    for template in templates {
        let (ident, arity) = shape_signature(template);
        registry
            .register(VariantType::new(ident, arity), Some(template.as_str()))
            .with_context(|| format!("declaring {template}"))?;
    }
    Ok(registry)
}

/// The identifier and arity a template implies: its name and its highest
/// `$n` placeholder.
fn shape_signature(template: &str) -> (String, usize) {
    let template = template.trim();
    let ident = template.split('(').next().unwrap_or_default().trim();
    let arity = template
        .split(['(', ',', ')'])
        .skip(1)
        .filter_map(|arg| arg.trim().strip_prefix('$')?.parse::<usize>().ok())
        .max()
        .unwrap_or(0);
    (ident.to_string(), arity)
}
