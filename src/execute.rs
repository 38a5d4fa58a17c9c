use crate::instructions::{Condition, IndexRegister, Instruction, LoadTarget, Register, RegisterPair, Target};
use crate::state::{Flags, Status, Z80};

const FLAGS_EXCEPT_CARRY: u8 = Flags::MASK & !(Flags::Carry as u8);
const FLAGS_EXCEPT_ADDSUB: u8 = Flags::MASK & !(Flags::AddSubtract as u8);

impl Z80 {
    /// Execute one instruction.  In the halted state this is a no-op; the
    /// only way back to execution is `reset`.
    pub fn step(&mut self) {
        if self.state.status == Status::Halted {
            return;
        }
        self.decode_next();
        self.execute_current();
    }

    fn decode_next(&mut self) {
        self.decoder.decode_at(&self.memory, self.state.pc);
        log::trace!("{:#06x}: {:?}", self.decoder.start, self.decoder.instruction);
        self.state.pc = self.decoder.end;
    }

    fn execute_current(&mut self) {
        match self.decoder.instruction {
            Instruction::ADCa(target) => {
                let value = self.get_target_value(target);
                self.add_to_acc(value, true);
            },
            Instruction::ADDa(target) => {
                let value = self.get_target_value(target);
                self.add_to_acc(value, false);
            },
            Instruction::AND(target) => {
                let value = self.get_target_value(target);
                let result = self.state.get_register(Register::A) & value;
                self.state.set_register(Register::A, result);
                self.set_logic_op_flags(result, true);
            },
            Instruction::CALL(addr) => {
                self.push_word(self.state.pc);
                self.state.pc = addr;
            },
            Instruction::CALLcc(cond, addr) => {
                if self.get_current_condition(cond) {
                    self.push_word(self.state.pc);
                    self.state.pc = addr;
                }
            },
            Instruction::CP(target) => {
                let value = self.get_target_value(target);
                self.sub_from_acc(value, false, false);
            },
            Instruction::DAA => self.decimal_adjust_acc(),
            Instruction::DEC8(target) => {
                let value = self.get_target_value(target);
                let result = value.wrapping_sub(1);

                let mut flags = Flags::AddSubtract as u8 | numeric_flags(result);
                if value & 0x0F == 0x00 {
                    flags |= Flags::HalfCarry as u8;
                }
                if value == 0x80 {
                    flags |= Flags::Parity as u8;
                }
                self.set_flags(FLAGS_EXCEPT_CARRY, flags);

                self.set_target_value(target, result);
            },
            Instruction::EXX => {
                for i in 0..6 {
                    std::mem::swap(&mut self.state.reg[i], &mut self.state.shadow_reg[i]);
                }
            },
            Instruction::EXafaf => {
                for i in 6..8 {
                    std::mem::swap(&mut self.state.reg[i], &mut self.state.shadow_reg[i]);
                }
            },
            Instruction::EXhlde => {
                let hl = self.state.get_pair(RegisterPair::HL);
                let de = self.state.get_pair(RegisterPair::DE);
                self.state.set_pair(RegisterPair::DE, hl);
                self.state.set_pair(RegisterPair::HL, de);
            },
            Instruction::HALT => {
                self.state.status = Status::Halted;
                // PC backs up onto the halt opcode, the stuck-at-halt shape
                // a Z80 shows while no interrupt arrives.
                self.state.pc = self.state.pc.wrapping_sub(1);
            },
            Instruction::INC8(target) => {
                let value = self.get_target_value(target);
                let result = value.wrapping_add(1);

                let mut flags = numeric_flags(result);
                if value & 0x0F == 0x0F {
                    flags |= Flags::HalfCarry as u8;
                }
                if value == 0x7F {
                    flags |= Flags::Parity as u8;
                }
                self.set_flags(FLAGS_EXCEPT_CARRY, flags);

                self.set_target_value(target, result);
            },
            Instruction::JP(addr) => {
                self.state.pc = addr;
            },
            Instruction::JPcc(cond, addr) => {
                if self.get_current_condition(cond) {
                    self.state.pc = addr;
                }
            },
            Instruction::JR(offset) => {
                self.state.pc = relative_target(self.state.pc, offset);
            },
            Instruction::JRcc(cond, offset) => {
                if self.get_current_condition(cond) {
                    self.state.pc = relative_target(self.state.pc, offset);
                }
            },
            Instruction::LD(dest, src) => {
                let value = self.get_load_target_value(src);
                self.set_load_target_value(dest, value);
            },
            Instruction::NOP => {},
            Instruction::OR(target) => {
                let value = self.get_target_value(target);
                let result = self.state.get_register(Register::A) | value;
                self.state.set_register(Register::A, result);
                self.set_logic_op_flags(result, false);
            },
            Instruction::POP(pair) => {
                let value = self.pop_word();
                self.state.set_pair(pair, value);
            },
            Instruction::PUSH(pair) => {
                let value = self.state.get_pair(pair);
                self.push_word(value);
            },
            Instruction::RET => {
                self.state.pc = self.pop_word();
            },
            Instruction::RETcc(cond) => {
                // Not taken leaves PC where the decoder put it; the opcode
                // byte is already consumed and nothing more moves.
                if self.get_current_condition(cond) {
                    self.state.pc = self.pop_word();
                }
            },
            Instruction::SBCa(target) => {
                let value = self.get_target_value(target);
                self.sub_from_acc(value, true, true);
            },
            Instruction::SCF => {
                self.set_flags(
                    Flags::Carry as u8 | Flags::AddSubtract as u8 | Flags::HalfCarry as u8,
                    Flags::Carry as u8,
                );
            },
            Instruction::SUB(target) => {
                let value = self.get_target_value(target);
                self.sub_from_acc(value, false, true);
            },
            Instruction::XOR(target) => {
                let value = self.get_target_value(target);
                let result = self.state.get_register(Register::A) ^ value;
                self.state.set_register(Register::A, result);
                self.set_logic_op_flags(result, false);
            },
        }
    }

    /// ADD/ADC.  Flags derive from the pre-operation accumulator and the
    /// raw operand, with the incoming carry as a third addend.
    fn add_to_acc(&mut self, value: u8, with_carry: bool) {
        let acc = self.state.get_register(Register::A);
        let carry_in = (with_carry && self.get_flag(Flags::Carry)) as u8;

        let sum = u16::from(acc) + u16::from(value) + u16::from(carry_in);
        let result = sum as u8;

        let mut flags = numeric_flags(result);
        if (acc & 0x0F) + (value & 0x0F) + carry_in > 0x0F {
            flags |= Flags::HalfCarry as u8;
        }
        if (acc ^ result) & (value ^ result) & 0x80 != 0 {
            flags |= Flags::Parity as u8;
        }
        if sum > 0xFF {
            flags |= Flags::Carry as u8;
        }
        self.set_flags(Flags::MASK, flags);

        self.state.set_register(Register::A, result);
    }

    /// SUB/SBC/CP.  CP discards the result but derives the same flags.
    fn sub_from_acc(&mut self, value: u8, with_carry: bool, store: bool) {
        let acc = self.state.get_register(Register::A);
        let carry_in = (with_carry && self.get_flag(Flags::Carry)) as u8;

        let taken = u16::from(value) + u16::from(carry_in);
        let result = u16::from(acc).wrapping_sub(taken) as u8;

        let mut flags = Flags::AddSubtract as u8 | numeric_flags(result);
        if u16::from(acc & 0x0F) < u16::from(value & 0x0F) + u16::from(carry_in) {
            flags |= Flags::HalfCarry as u8;
        }
        if (acc ^ value) & (acc ^ result) & 0x80 != 0 {
            flags |= Flags::Parity as u8;
        }
        if u16::from(acc) < taken {
            flags |= Flags::Carry as u8;
        }
        self.set_flags(Flags::MASK, flags);

        if store {
            self.state.set_register(Register::A, result);
        }
    }

    fn set_logic_op_flags(&mut self, result: u8, half_carry: bool) {
        let mut flags = numeric_flags(result);
        if parity_even(result) {
            flags |= Flags::Parity as u8;
        }
        if half_carry {
            flags |= Flags::HalfCarry as u8;
        }
        self.set_flags(Flags::MASK, flags);
    }

    /// BCD correction of the accumulator after an 8-bit add or subtract.
    /// The adjustment is 0x06/0x60 per nibble after an addition and the
    /// two's complement equivalents 0xFA/0xA0 after a subtraction, selected
    /// by the H and C flags and the nibble values.  N survives; it records
    /// the direction of the operation being corrected.
    fn decimal_adjust_acc(&mut self) {
        let acc = self.state.get_register(Register::A);
        let subtract = self.get_flag(Flags::AddSubtract);

        let mut adjust = 0u8;
        let mut carry = false;
        if !subtract {
            if self.get_flag(Flags::HalfCarry) || acc & 0x0F > 0x09 {
                adjust = 0x06;
            }
            if self.get_flag(Flags::Carry) || acc > 0x99 || u16::from(acc) + u16::from(adjust) > 0x99 {
                adjust = adjust.wrapping_add(0x60);
                carry = true;
            }
        } else {
            if self.get_flag(Flags::HalfCarry) || acc & 0x0F > 0x09 {
                adjust = 0xFA;
            }
            if self.get_flag(Flags::Carry) {
                adjust = adjust.wrapping_add(0xA0);
                carry = true;
            } else {
                carry = acc < adjust;
            }
        }

        let result = acc.wrapping_add(adjust);

        let mut flags = numeric_flags(result);
        if parity_even(result) {
            flags |= Flags::Parity as u8;
        }
        if carry {
            flags |= Flags::Carry as u8;
        }
        if !subtract && (acc & 0x0F) + (adjust & 0x0F) > 0x0F {
            flags |= Flags::HalfCarry as u8;
        }
        self.set_flags(FLAGS_EXCEPT_ADDSUB, flags);

        self.state.set_register(Register::A, result);
    }

    fn get_target_value(&self, target: Target) -> u8 {
        match target {
            Target::DirectReg(reg) => self.state.get_register(reg),
            Target::IndirectReg(pair) => self.memory.read_u8(self.state.get_pair(pair)),
            Target::IndirectOffset(reg, offset) => self.memory.read_u8(self.index_address(reg, offset)),
            Target::Immediate(data) => data,
        }
    }

    fn set_target_value(&mut self, target: Target, value: u8) {
        match target {
            Target::DirectReg(reg) => self.state.set_register(reg, value),
            Target::IndirectReg(pair) => {
                let addr = self.state.get_pair(pair);
                self.memory.write_u8(addr, value);
            },
            Target::IndirectOffset(reg, offset) => {
                let addr = self.index_address(reg, offset);
                self.memory.write_u8(addr, value);
            },
            Target::Immediate(_) => unreachable!("immediate is never a store destination"),
        }
    }

    fn get_load_target_value(&self, target: LoadTarget) -> u16 {
        match target {
            LoadTarget::DirectRegByte(reg) => u16::from(self.state.get_register(reg)),
            LoadTarget::DirectRegWord(pair) => self.state.get_pair(pair),
            LoadTarget::IndirectRegByte(pair) => u16::from(self.memory.read_u8(self.state.get_pair(pair))),
            LoadTarget::IndirectOffsetByte(reg, offset) => u16::from(self.memory.read_u8(self.index_address(reg, offset))),
            LoadTarget::ImmediateByte(data) => u16::from(data),
            LoadTarget::ImmediateWord(data) => data,
        }
    }

    fn set_load_target_value(&mut self, target: LoadTarget, value: u16) {
        match target {
            LoadTarget::DirectRegByte(reg) => self.state.set_register(reg, value as u8),
            LoadTarget::DirectRegWord(pair) => self.state.set_pair(pair, value),
            LoadTarget::IndirectRegByte(pair) => {
                let addr = self.state.get_pair(pair);
                self.memory.write_u8(addr, value as u8);
            },
            LoadTarget::IndirectOffsetByte(reg, offset) => {
                let addr = self.index_address(reg, offset);
                self.memory.write_u8(addr, value as u8);
            },
            LoadTarget::ImmediateByte(_) | LoadTarget::ImmediateWord(_) => {
                unreachable!("immediate is never a store destination")
            },
        }
    }

    /// Effective address of (IX+d)/(IY+d): the displacement is sign
    /// extended and the sum wraps to 16 bits.
    fn index_address(&self, reg: IndexRegister, offset: i8) -> u16 {
        let base = match reg {
            IndexRegister::IX => self.state.ix,
            IndexRegister::IY => self.state.iy,
        };
        base.wrapping_add(offset as i16 as u16)
    }

    fn push_word(&mut self, value: u16) {
        self.state.sp = self.state.sp.wrapping_sub(1);
        self.memory.write_u8(self.state.sp, (value >> 8) as u8);
        self.state.sp = self.state.sp.wrapping_sub(1);
        self.memory.write_u8(self.state.sp, value as u8);
    }

    fn pop_word(&mut self) -> u16 {
        let low = self.memory.read_u8(self.state.sp);
        self.state.sp = self.state.sp.wrapping_add(1);
        let high = self.memory.read_u8(self.state.sp);
        self.state.sp = self.state.sp.wrapping_add(1);
        u16::from_le_bytes([low, high])
    }

    fn get_current_condition(&self, cond: Condition) -> bool {
        match cond {
            Condition::NotZero => !self.get_flag(Flags::Zero),
            Condition::Zero => self.get_flag(Flags::Zero),
            Condition::NotCarry => !self.get_flag(Flags::Carry),
            Condition::Carry => self.get_flag(Flags::Carry),
            Condition::ParityOdd => !self.get_flag(Flags::Parity),
            Condition::ParityEven => self.get_flag(Flags::Parity),
            Condition::Positive => !self.get_flag(Flags::Sign),
            Condition::Negative => self.get_flag(Flags::Sign),
        }
    }

    fn get_flag(&self, flag: Flags) -> bool {
        self.state.get_register(Register::F) & (flag as u8) != 0
    }

    fn set_flags(&mut self, mask: u8, values: u8) {
        let flags = (self.state.get_register(Register::F) & !mask) | values;
        self.state.set_register(Register::F, flags);
    }
}

fn numeric_flags(result: u8) -> u8 {
    let mut flags = 0;
    if result == 0 {
        flags |= Flags::Zero as u8;
    }
    if result & 0x80 != 0 {
        flags |= Flags::Sign as u8;
    }
    flags
}

fn parity_even(value: u8) -> bool {
    value.count_ones() & 0x01 == 0
}

/// JR lands relative to the byte after the displacement, which is where
/// the decoder already left PC.
fn relative_target(pc: u16, offset: i8) -> u16 {
    pc.wrapping_add(offset as i16 as u16)
}
