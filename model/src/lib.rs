//! A bit-exact, cycle-accurate golden model of a single-cycle load/store
//! processor, configurable over a narrow 8-bit teaching ISA and a 32-bit
//! RISC-V subset. Intended as the reference half of a hardware
//! cosimulation harness: each `step` returns the cycle's observable
//! effects and the full architectural state is available for diffing.

pub mod alu;
pub mod control;
pub mod cpu;
pub mod error;
pub mod imm;
pub mod isa;
pub mod mem;
pub mod pc;
pub mod programs;
pub mod regfile;

use std::path::PathBuf;

use clap::{Args, ValueEnum};

pub use cpu::{Cpu, CycleRecord, Snapshot};
pub use error::{ModelError, Result};
pub use isa::{Isa, MICRO8, RV32};

/// command-line selectable machine
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum IsaKind {
    Micro8,
    Rv32,
}

impl IsaKind {
    pub fn isa(self) -> &'static Isa {
        match self {
            IsaKind::Micro8 => &MICRO8,
            IsaKind::Rv32 => &RV32,
        }
    }
}

#[derive(Debug, Args)]
pub struct SimOpts {
    /// Machine description to simulate
    #[arg(long, value_enum, default_value = "rv32")]
    pub isa: IsaKind,

    /// Number of cycles to run (default: the machine's own cycle count,
    /// or 32)
    #[arg(short, long)]
    pub cycles: Option<usize>,

    /// Name of a built-in test machine (overrides --isa and FILE)
    #[arg(short, long)]
    pub machine: Option<String>,

    /// Flat binary preloaded into data memory at address 0
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Program image, a flat binary
    pub file: Option<PathBuf>,
}

/// Build a CPU from the command-line options, returning it with the
/// number of cycles to run.
pub fn load_sim(opts: &SimOpts) -> Result<(Cpu, usize)> {
    if let Some(name) = &opts.machine {
        let machine = programs::lookup_machine(name)?;
        return Ok((machine.boot()?, opts.cycles.unwrap_or(machine.cycles)));
    }
    let mut cpu = Cpu::new(opts.isa.isa());
    if let Some(file) = &opts.file {
        let image = std::fs::read(file)?;
        cpu.load_program(&image)?;
    }
    if let Some(file) = &opts.data {
        let image = std::fs::read(file)?;
        cpu.load_data(&image)?;
    }
    Ok((cpu, opts.cycles.unwrap_or(32)))
}

/// Run a loaded CPU for the requested cycles, optionally printing the
/// per-cycle trace.
pub fn run_sim(cpu: &mut Cpu, cycles: usize, show: bool) -> Result<()> {
    if show {
        println!("  pc    word      result");
    }
    for _ in 0..cycles {
        let record = cpu.step()?;
        if show {
            println!("{record}");
        }
    }
    Ok(())
}

/// print the final register file the way the trace prints cycles
pub fn show_registers(cpu: &Cpu) {
    println!("pc = {:#010x}", cpu.pc());
    for (i, value) in cpu.registers().iter().enumerate() {
        print!("x{i:<3} = {value:#010x}  ");
        if i % 4 == 3 {
            println!();
        }
    }
}
