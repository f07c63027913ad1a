use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use miette::WrapErr;
use miette::miette;
use unitcalc::interpret::Reify;
use unitcalc::systems;
use unitcalc::{LiteralParser, System, calculate, print_expression};

#[derive(Parser, Debug)]
#[command(about = "Unit-aware arithmetic expression calculator")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate an expression and print the result.
    Eval {
        expression: String,
        /// Unit system to evaluate against.
        #[arg(long, default_value = "length")]
        system: String,
        /// Unit to read the result in; defaults to the system's base unit.
        #[arg(long)]
        unit: Option<String>,
    },
    /// Print an expression back fully parenthesized.
    Print {
        expression: String,
        #[arg(long, default_value = "length")]
        system: String,
    },
    /// Dump the expression tree.
    Ast {
        expression: String,
        #[arg(long, default_value = "length")]
        system: String,
    },
    /// Convert a single literal like `4rem` into another unit.
    Convert {
        value: String,
        #[arg(long, default_value = "length")]
        system: String,
        #[arg(long)]
        unit: String,
    },
}

fn system_by_name(name: &str) -> miette::Result<System> {
    match name {
        "length" => Ok(systems::length_system()),
        "time" => Ok(systems::time_system()),
        "mass" => Ok(systems::mass_system()),
        "temperature" => Ok(systems::temperature_system()),
        "substance" => Ok(systems::amount_of_substance_system()),
        "current" => Ok(systems::electric_current_system()),
        "luminosity" => Ok(systems::luminous_intensity_system()),
        "css" => Ok(systems::css_system()),
        other => Err(miette!(
            "unknown system `{other}`, expected one of: length, time, mass, \
             temperature, substance, current, luminosity, css"
        )),
    }
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Eval {
            expression,
            system,
            unit,
        } => {
            let system = system_by_name(&system)?;
            let result = calculate(&system, &expression)?;
            let result = match unit {
                Some(unit) => result
                    .get(&unit)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("converting the result into `{unit}` failed"))?,
                None => result,
            };
            println!("{result}");
        }
        Commands::Print { expression, system } => {
            let system = system_by_name(&system)?;
            println!("{}", print_expression(&system, &expression)?);
        }
        Commands::Ast { expression, system } => {
            let system = system_by_name(&system)?;
            let units: Vec<_> = system.unit_names().collect();
            let node = unitcalc::parse::Parser::new(&units, &Reify).parse(&expression)?;
            println!("{node:#?}");
        }
        Commands::Convert {
            value,
            system,
            unit,
        } => {
            let system = system_by_name(&system)?;
            let parsed = LiteralParser::new(&system)
                .parse(&value)
                .into_diagnostic()?;
            let converted = parsed
                .get(&unit)
                .into_diagnostic()
                .wrap_err_with(|| format!("converting `{value}` into `{unit}` failed"))?;
            println!("{converted}");
        }
    }
    Ok(())
}
