use crate::instructions::{Condition, IndexRegister, Instruction, LoadTarget, Register, RegisterPair, Target};
use crate::memory::MemoryBlock;

/// Instruction decoder for the base and 0xDD/0xFD opcode spaces.
///
/// `start` is the address the instruction was fetched from and `end` the
/// address of the byte after it; everything in between (opcode, prefix and
/// operand bytes) has been consumed.  Encodings outside the implemented
/// set decode to `NOP` with `end` just past the opcode and prefix bytes,
/// leaving any would-be operand bytes unconsumed.
#[derive(Clone, Debug)]
pub struct Z80Decoder {
    pub start: u16,
    pub end: u16,
    pub instruction: Instruction,
}

impl Default for Z80Decoder {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            instruction: Instruction::NOP,
        }
    }
}

impl Z80Decoder {
    pub fn decode_at(&mut self, memory: &MemoryBlock, start: u16) {
        self.start = start;
        self.end = start;
        let ins = self.read_instruction_byte(memory);
        self.instruction = self.decode_bare(memory, ins);
    }

    fn decode_bare(&mut self, memory: &MemoryBlock, ins: u8) -> Instruction {
        match get_ins_x(ins) {
            0 => match get_ins_z(ins) {
                0 => match get_ins_y(ins) {
                    0 => Instruction::NOP,
                    1 => Instruction::EXafaf,
                    2 => Instruction::NOP, // DJNZ
                    3 => {
                        let offset = self.read_instruction_byte(memory) as i8;
                        Instruction::JR(offset)
                    },
                    y => {
                        let offset = self.read_instruction_byte(memory) as i8;
                        Instruction::JRcc(get_condition(y - 4), offset)
                    },
                },
                1 => {
                    if get_ins_q(ins) == 0 {
                        let data = self.read_instruction_word(memory);
                        Instruction::LD(LoadTarget::DirectRegWord(get_register_pair(get_ins_p(ins))), LoadTarget::ImmediateWord(data))
                    } else {
                        Instruction::NOP // ADD HL,rr
                    }
                },
                2 | 3 => Instruction::NOP, // accumulator indirects, 16-bit INC/DEC
                4 => Instruction::INC8(get_register(get_ins_y(ins))),
                5 => Instruction::DEC8(get_register(get_ins_y(ins))),
                6 => {
                    let data = self.read_instruction_byte(memory);
                    Instruction::LD(to_load_target(get_register(get_ins_y(ins))), LoadTarget::ImmediateByte(data))
                },
                7 => match get_ins_y(ins) {
                    4 => Instruction::DAA,
                    6 => Instruction::SCF,
                    _ => Instruction::NOP, // rotate/complement group
                },
                _ => unreachable!(),
            },
            1 => {
                // The r,r grid, except that the (HL),(HL) slot encodes HALT.
                if ins == 0x76 {
                    Instruction::HALT
                } else {
                    Instruction::LD(to_load_target(get_register(get_ins_y(ins))), to_load_target(get_register(get_ins_z(ins))))
                }
            },
            2 => get_alu_instruction(get_ins_y(ins), get_register(get_ins_z(ins))),
            3 => match get_ins_z(ins) {
                0 => Instruction::RETcc(get_condition(get_ins_y(ins))),
                1 => {
                    if get_ins_q(ins) == 0 {
                        Instruction::POP(get_register_pair_alt(get_ins_p(ins)))
                    } else {
                        match get_ins_p(ins) {
                            0 => Instruction::RET,
                            1 => Instruction::EXX,
                            _ => Instruction::NOP, // JP (HL), LD SP,HL
                        }
                    }
                },
                2 => {
                    let addr = self.read_instruction_word(memory);
                    Instruction::JPcc(get_condition(get_ins_y(ins)), addr)
                },
                3 => match get_ins_y(ins) {
                    0 => {
                        let addr = self.read_instruction_word(memory);
                        Instruction::JP(addr)
                    },
                    5 => Instruction::EXhlde,
                    _ => Instruction::NOP, // bit prefix, I/O, EX (SP),HL, DI/EI
                },
                4 => {
                    let addr = self.read_instruction_word(memory);
                    Instruction::CALLcc(get_condition(get_ins_y(ins)), addr)
                },
                5 => {
                    if get_ins_q(ins) == 0 {
                        Instruction::PUSH(get_register_pair_alt(get_ins_p(ins)))
                    } else {
                        match get_ins_p(ins) {
                            0 => {
                                let addr = self.read_instruction_word(memory);
                                Instruction::CALL(addr)
                            },
                            1 => self.decode_prefix_dd_fd(memory, IndexRegister::IX),
                            3 => self.decode_prefix_dd_fd(memory, IndexRegister::IY),
                            _ => Instruction::NOP, // ED prefix
                        }
                    }
                },
                6 => {
                    let data = self.read_instruction_byte(memory);
                    get_alu_instruction(get_ins_y(ins), Target::Immediate(data))
                },
                7 => Instruction::NOP, // RST
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }

    /// The 0xDD/0xFD space.  Only the encodings that reference memory
    /// through the index register are defined here; everything else in the
    /// prefixed space decodes as an unknown opcode.
    fn decode_prefix_dd_fd(&mut self, memory: &MemoryBlock, index_reg: IndexRegister) -> Instruction {
        let ins = self.read_instruction_byte(memory);

        match get_ins_x(ins) {
            0 => match ins {
                0x21 => {
                    let data = self.read_instruction_word(memory);
                    Instruction::LD(LoadTarget::DirectRegWord(index_reg.into()), LoadTarget::ImmediateWord(data))
                },
                0x34 => {
                    let offset = self.read_instruction_byte(memory) as i8;
                    Instruction::INC8(Target::IndirectOffset(index_reg, offset))
                },
                0x35 => {
                    let offset = self.read_instruction_byte(memory) as i8;
                    Instruction::DEC8(Target::IndirectOffset(index_reg, offset))
                },
                0x36 => {
                    let offset = self.read_instruction_byte(memory) as i8;
                    let immediate = self.read_instruction_byte(memory);
                    Instruction::LD(LoadTarget::IndirectOffsetByte(index_reg, offset), LoadTarget::ImmediateByte(immediate))
                },
                _ => Instruction::NOP,
            },
            1 => {
                let dest = get_ins_y(ins);
                let src = get_ins_z(ins);
                if src == 6 && dest != 6 {
                    let offset = self.read_instruction_byte(memory) as i8;
                    Instruction::LD(to_load_target(get_register(dest)), LoadTarget::IndirectOffsetByte(index_reg, offset))
                } else if dest == 6 && src != 6 {
                    let offset = self.read_instruction_byte(memory) as i8;
                    Instruction::LD(LoadTarget::IndirectOffsetByte(index_reg, offset), to_load_target(get_register(src)))
                } else {
                    // Covers prefixed 0x76 as well: there is no HALT in
                    // this space.
                    Instruction::NOP
                }
            },
            2 => {
                if get_ins_z(ins) == 6 {
                    let offset = self.read_instruction_byte(memory) as i8;
                    get_alu_instruction(get_ins_y(ins), Target::IndirectOffset(index_reg, offset))
                } else {
                    Instruction::NOP
                }
            },
            _ => Instruction::NOP,
        }
    }

    fn read_instruction_byte(&mut self, memory: &MemoryBlock) -> u8 {
        let byte = memory.read_u8(self.end);
        self.end = self.end.wrapping_add(1);
        byte
    }

    fn read_instruction_word(&mut self, memory: &MemoryBlock) -> u16 {
        let word = memory.read_leu16(self.end);
        self.end = self.end.wrapping_add(2);
        word
    }
}

impl From<IndexRegister> for RegisterPair {
    fn from(value: IndexRegister) -> Self {
        match value {
            IndexRegister::IX => RegisterPair::IX,
            IndexRegister::IY => RegisterPair::IY,
        }
    }
}

fn get_alu_instruction(alu: u8, target: Target) -> Instruction {
    match alu {
        0 => Instruction::ADDa(target),
        1 => Instruction::ADCa(target),
        2 => Instruction::SUB(target),
        3 => Instruction::SBCa(target),
        4 => Instruction::AND(target),
        5 => Instruction::XOR(target),
        6 => Instruction::OR(target),
        7 => Instruction::CP(target),
        _ => unreachable!(),
    }
}

/// Map the 3-bit r-field onto an operand.  Code 6 names the memory cell
/// addressed by HL; in the prefixed space the callers substitute the
/// displaced index form instead of calling this.
fn get_register(reg: u8) -> Target {
    match reg {
        0 => Target::DirectReg(Register::B),
        1 => Target::DirectReg(Register::C),
        2 => Target::DirectReg(Register::D),
        3 => Target::DirectReg(Register::E),
        4 => Target::DirectReg(Register::H),
        5 => Target::DirectReg(Register::L),
        6 => Target::IndirectReg(RegisterPair::HL),
        7 => Target::DirectReg(Register::A),
        _ => unreachable!(),
    }
}

fn to_load_target(target: Target) -> LoadTarget {
    match target {
        Target::DirectReg(reg) => LoadTarget::DirectRegByte(reg),
        Target::IndirectReg(reg) => LoadTarget::IndirectRegByte(reg),
        Target::IndirectOffset(reg, offset) => LoadTarget::IndirectOffsetByte(reg, offset),
        Target::Immediate(data) => LoadTarget::ImmediateByte(data),
    }
}

fn get_register_pair(reg: u8) -> RegisterPair {
    match reg {
        0 => RegisterPair::BC,
        1 => RegisterPair::DE,
        2 => RegisterPair::HL,
        3 => RegisterPair::SP,
        _ => unreachable!(),
    }
}

fn get_register_pair_alt(reg: u8) -> RegisterPair {
    match reg {
        0 => RegisterPair::BC,
        1 => RegisterPair::DE,
        2 => RegisterPair::HL,
        3 => RegisterPair::AF,
        _ => unreachable!(),
    }
}

fn get_condition(cond: u8) -> Condition {
    match cond {
        0 => Condition::NotZero,
        1 => Condition::Zero,
        2 => Condition::NotCarry,
        3 => Condition::Carry,
        4 => Condition::ParityOdd,
        5 => Condition::ParityEven,
        6 => Condition::Positive,
        7 => Condition::Negative,
        _ => unreachable!(),
    }
}

// Opcodes are split into the x (bits 7-6), y (5-3) and z (2-0) fields,
// with y split further into p (5-4) and q (3) where the pair grids need
// it.  The r-field, ALU and condition tables above index by y or z.

fn get_ins_x(ins: u8) -> u8 {
    (ins >> 6) & 0x03
}

fn get_ins_y(ins: u8) -> u8 {
    (ins >> 3) & 0x07
}

fn get_ins_z(ins: u8) -> u8 {
    ins & 0x07
}

fn get_ins_p(ins: u8) -> u8 {
    (ins >> 4) & 0x03
}

fn get_ins_q(ins: u8) -> u8 {
    (ins >> 3) & 0x01
}
