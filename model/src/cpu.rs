//! The single-cycle processor model.
//!
//! `step` evaluates one full cycle combinationally and then commits data
//! memory, the register file and the PC together, so an addressing error
//! anywhere in the cycle leaves architectural state untouched. The same
//! datapath serves both machine descriptions; all differences are read
//! from the `Isa` table.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::alu;
use crate::control::{decode, WbSrc};
use crate::error::{
    ModelError::{ImageTooLarge, MalformedImage},
    Result,
};
use crate::imm;
use crate::isa::{BranchBase, FetchLayout, Isa};
use crate::mem::{MemCycle, Memory};
use crate::pc::{PcSel, ProgramCounter};
use crate::regfile::RegisterFile;

/// The observable effects of one cycle.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct CycleRecord {
    pub pc: u32,
    /// raw instruction word as fetched
    pub word: u32,
    pub alu_result: u32,
    /// register writeback this cycle, (index, data)
    pub reg_write: Option<(u32, u32)>,
    /// data memory write this cycle, (address, data)
    pub mem_write: Option<(u32, u32)>,
    pub next_pc: u32,
}

impl Display for CycleRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}  {:08x}  alu={:08x}", self.pc, self.word, self.alu_result)?;
        if let Some((r, v)) = self.reg_write {
            write!(f, "  x{r}<-{v:x}")?;
        }
        if let Some((a, v)) = self.mem_write {
            write!(f, "  mem[{a:x}]<-{v:x}")?;
        }
        write!(f, "  -> {:04x}", self.next_pc)
    }
}

/// Serializable architectural state, for harness consumption.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub isa: String,
    pub pc: u32,
    pub regs: Vec<u32>,
    pub dmem: Vec<u32>,
}

pub struct Cpu {
    isa: &'static Isa,
    pc: ProgramCounter,
    regs: RegisterFile,
    imem: Memory,
    dmem: Memory,
    /// data memory as loaded, restored on reset
    dmem_image: Vec<u32>,
    last: CycleRecord,
}

impl Cpu {
    pub fn new(isa: &'static Isa) -> Self {
        let imem_mask = match isa.fetch {
            FetchLayout::PackedBytesHighFirst => 0xff,
            FetchLayout::Words => u32::MAX,
        };
        let dmem = Memory::new(isa.dmem_depth, isa.mask());
        let dmem_image = dmem.snapshot();
        Cpu {
            isa,
            pc: ProgramCounter::new(isa.inst_bytes, isa.mask()),
            regs: RegisterFile::new(isa.reg_count, isa.mask()),
            imem: Memory::new(isa.imem_depth, imem_mask),
            dmem,
            dmem_image,
            last: CycleRecord::default(),
        }
    }

    pub fn isa(&self) -> &'static Isa {
        self.isa
    }

    /// Load a flat program image into instruction memory.
    ///
    /// Wide machines take packed little-endian words; the narrow machine
    /// takes two bytes per instruction stored as fetched, high byte at the
    /// lower address.
    pub fn load_program(&mut self, image: &[u8]) -> Result<()> {
        let unit = self.isa.inst_bytes as usize;
        if image.len() % unit != 0 {
            return Err(MalformedImage { len: image.len(), unit });
        }
        match self.isa.fetch {
            FetchLayout::PackedBytesHighFirst => {
                if image.len() > self.imem.depth() {
                    return Err(ImageTooLarge {
                        len: image.len(),
                        depth: self.imem.depth(),
                    });
                }
                for (i, b) in image.iter().enumerate() {
                    self.imem.poke(i as u32, *b as u32)?;
                }
            }
            FetchLayout::Words => {
                let words = image.len() / 4;
                if words > self.imem.depth() {
                    return Err(ImageTooLarge { len: words, depth: self.imem.depth() });
                }
                for (i, chunk) in image.chunks_exact(4).enumerate() {
                    let word =
                        u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                    self.imem.poke(i as u32, word)?;
                }
            }
        }
        Ok(())
    }

    /// Preload one data memory cell; the value becomes part of the image
    /// that `reset` restores.
    pub fn preload_data(&mut self, addr: u32, value: u32) -> Result<()> {
        self.dmem.poke(addr, value)?;
        self.dmem_image = self.dmem.snapshot();
        Ok(())
    }

    /// Load a flat data image at address 0, one cell per `xlen/8`-byte
    /// little-endian group.
    pub fn load_data(&mut self, image: &[u8]) -> Result<()> {
        let unit = (self.isa.xlen / 8) as usize;
        if image.len() % unit != 0 {
            return Err(MalformedImage { len: image.len(), unit });
        }
        let cells = image.len() / unit;
        if cells > self.dmem.depth() {
            return Err(ImageTooLarge { len: cells, depth: self.dmem.depth() });
        }
        for (i, chunk) in image.chunks_exact(unit).enumerate() {
            let mut val = 0u32;
            for (k, b) in chunk.iter().enumerate() {
                val |= (*b as u32) << (8 * k);
            }
            self.dmem.poke(i as u32, val)?;
        }
        self.dmem_image = self.dmem.snapshot();
        Ok(())
    }

    /// synchronous reset: PC and registers clear, data memory returns to
    /// the loaded image
    pub fn reset(&mut self) {
        self.pc.reset();
        self.regs.reset();
        self.dmem.restore(&self.dmem_image);
        self.last = CycleRecord::default();
    }

    fn fetch(&self, pc: u32) -> Result<u32> {
        match self.isa.fetch {
            FetchLayout::PackedBytesHighFirst => {
                let hi = self.imem.read(&MemCycle {
                    addr: pc,
                    read_en: true,
                    ..Default::default()
                })?;
                // pc+1 deliberately unmasked so a fetch at the top of the
                // address space faults instead of wrapping
                let lo = self.imem.read(&MemCycle {
                    addr: pc + 1,
                    read_en: true,
                    ..Default::default()
                })?;
                Ok((hi << 8) | lo)
            }
            FetchLayout::Words => self.imem.read(&MemCycle {
                addr: pc >> 2,
                read_en: true,
                ..Default::default()
            }),
        }
    }

    /// Execute one cycle and commit all state atomically.
    pub fn step(&mut self) -> Result<CycleRecord> {
        let isa = self.isa;
        let pc = self.pc.value();

        // fetch and decode
        let word = self.fetch(pc)?;
        let opcode = isa.opcode.extract(word);
        let ctl = decode(isa, opcode, isa.funct3_of(word), isa.funct7_of(word));
        let regs = isa
            .classify(opcode)
            .map(|spec| spec.regs)
            .unwrap_or_default();

        // register and immediate read
        let rs1 = regs.rs1.map_or(0, |f| self.regs.read(f.extract(word)));
        let rs2 = regs.rs2.map_or(0, |f| self.regs.read(f.extract(word)));
        let imm = imm::generate(isa, word, ctl.imm_sel);

        // execute
        let b = if ctl.alu_src_imm { imm } else { rs2 };
        let alu = alu::eval(isa, ctl.alu_op, rs1, b);

        // gated data memory access
        let dmem_cycle = MemCycle {
            addr: alu.result >> isa.dmem_addr_shift,
            write_data: rs2,
            read_en: ctl.mem_read,
            write_en: ctl.mem_write,
        };
        let mem_out = self.dmem.read(&dmem_cycle)?;

        // writeback select
        let wb = match ctl.wb_src {
            WbSrc::Alu => alu.result,
            WbSrc::Mem => mem_out,
        };
        let rd = regs.rd.map(|f| f.extract(word));

        // next PC
        let branch_base = match isa.branch_base {
            BranchBase::SequentialPc => pc.wrapping_add(isa.inst_bytes),
            BranchBase::Pc => pc,
        };
        let branch_target = branch_base.wrapping_add(imm) & isa.mask();
        let jump_target = isa.jump_target.map_or(0, |f| f.extract(word));
        let sel = PcSel::resolve(ctl.branch, ctl.jump, alu.zero);

        // commit
        self.dmem.clock(&dmem_cycle)?;
        let reg_write = match rd {
            Some(r) if ctl.reg_write => {
                self.regs.clock(true, r, wb);
                Some((r, wb & isa.mask()))
            }
            _ => None,
        };
        self.pc.clock(sel, branch_target, jump_target);

        let record = CycleRecord {
            pc,
            word,
            alu_result: alu.result,
            reg_write,
            mem_write: if ctl.mem_write {
                Some((dmem_cycle.addr, rs2 & isa.mask()))
            } else {
                None
            },
            next_pc: self.pc.value(),
        };
        tracing::trace!(target: "cycle", "{record}");
        self.last = record;
        Ok(record)
    }

    // -- read-only introspection --

    /// current program counter
    pub fn pc(&self) -> u32 {
        self.pc.value()
    }

    /// raw instruction word of the most recent cycle
    pub fn last_instruction(&self) -> u32 {
        self.last.word
    }

    /// ALU result of the most recent cycle
    pub fn last_alu_result(&self) -> u32 {
        self.last.alu_result
    }

    /// register writeback of the most recent cycle, if any
    pub fn last_reg_write(&self) -> Option<(u32, u32)> {
        self.last.reg_write
    }

    /// get value of register r
    pub fn reg(&self, r: u32) -> u32 {
        self.regs.read(r)
    }

    pub fn registers(&self) -> Vec<u32> {
        self.regs.contents()
    }

    /// data memory cell at `addr`
    pub fn data(&self, addr: u32) -> Result<u32> {
        self.dmem.peek(addr)
    }

    pub fn data_memory(&self) -> &[u32] {
        self.dmem.cells()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            isa: self.isa.name.to_string(),
            pc: self.pc.value(),
            regs: self.regs.contents(),
            dmem: self.dmem.snapshot(),
        }
    }
}
