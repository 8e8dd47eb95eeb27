use clap::Parser;

use lockstep_model::{load_sim, run_sim, show_registers, SimOpts};

#[derive(Debug, Parser)]
#[command(author, version, about = "golden model for single-cycle processor cosimulation")]
struct Opts {
    /// Print the cycle trace while running
    #[arg(short, long)]
    trace: bool,

    /// Emit the final architectural state as JSON
    #[arg(short, long)]
    json: bool,

    #[command(flatten)]
    sim: SimOpts,
}

fn main() {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let (mut cpu, cycles) = match load_sim(&opts.sim) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("{e}");
            return;
        }
    };
    if let Err(e) = run_sim(&mut cpu, cycles, opts.trace) {
        println!("{e}");
        return;
    }
    if opts.json {
        match serde_json::to_string(&cpu.snapshot()) {
            Ok(s) => println!("{s}"),
            Err(e) => println!("{e}"),
        }
    } else {
        show_registers(&cpu);
    }
}
