use std::path::PathBuf;

use clap::Parser;

/// Run a network simulation from a topology spec and a message program.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topology spec file (.json or .dhall)
    topology: PathBuf,

    /// Program spec file (.json or .dhall)
    program: PathBuf,

    /// If given, write per-event link contention counts to this CSV path
    #[arg(long)]
    contention_log: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let topology_spec = netsim::io::read_topology_spec(&args.topology)?;
    let program_spec = netsim::io::read_program_spec(&args.program)?;

    let (mut network, nodes) = topology_spec.build()?;
    let (program, named_ids) = program_spec.build(&nodes)?;

    if let Some(path) = &args.contention_log {
        network.set_contention_sink(Box::new(netsim::CsvContentionSink::create(path)?));
    }

    let final_time = network.run_program(program)?;

    println!("simulation finished at {final_time}");
    for (name, id) in &named_ids {
        match network.completion_time(*id) {
            Some(time) => println!("{name}: {time}"),
            None => println!("{name}: never completed"),
        }
    }
    if let Some(path) = &args.contention_log {
        println!("contention log written to {}", path.display());
    }

    Ok(())
}
