use weka_z80::{Condition, IndexRegister, Instruction, LoadTarget, Register, RegisterPair, Target, Z80};

fn run_decode_test(data: &[u8]) -> Instruction {
    let mut cpu = Z80::new();
    cpu.load_at(0, data).unwrap();
    cpu.step();
    cpu.decoder.instruction
}

#[test]
fn run_all_decode_tests() {
    let mut failures = vec![];

    for (data, expected) in DECODE_TESTS {
        let instruction = run_decode_test(data);
        if instruction != *expected {
            failures.push((data, instruction, expected));
        }
    }

    let fails = failures.len();
    for (data, instruction, expected) in failures {
        println!("for {:02x?}\nexpected:\t{:?}\nreceived:\t{:?}\n", data, expected, instruction);
    }

    if fails > 0 {
        panic!("{} decode tests failed", fails);
    }
}

#[rustfmt::skip]
const DECODE_TESTS: &[(&[u8], Instruction)] = &[
    (&[0x00],                   Instruction::NOP),
    (&[0x01, 0x01, 0x02],       Instruction::LD(LoadTarget::DirectRegWord(RegisterPair::BC), LoadTarget::ImmediateWord(0x0201))),
    (&[0x04],                   Instruction::INC8(Target::DirectReg(Register::B))),
    (&[0x05],                   Instruction::DEC8(Target::DirectReg(Register::B))),
    (&[0x06, 0x55],             Instruction::LD(LoadTarget::DirectRegByte(Register::B), LoadTarget::ImmediateByte(0x55))),
    (&[0x08],                   Instruction::EXafaf),
    (&[0x0E, 0xAA],             Instruction::LD(LoadTarget::DirectRegByte(Register::C), LoadTarget::ImmediateByte(0xAA))),
    (&[0x11, 0x34, 0x12],       Instruction::LD(LoadTarget::DirectRegWord(RegisterPair::DE), LoadTarget::ImmediateWord(0x1234))),
    (&[0x18, 0x10],             Instruction::JR(16)),
    (&[0x20, 0xFE],             Instruction::JRcc(Condition::NotZero, -2)),
    (&[0x21, 0xBC, 0x9A],       Instruction::LD(LoadTarget::DirectRegWord(RegisterPair::HL), LoadTarget::ImmediateWord(0x9ABC))),
    (&[0x27],                   Instruction::DAA),
    (&[0x28, 0x05],             Instruction::JRcc(Condition::Zero, 5)),
    (&[0x2C],                   Instruction::INC8(Target::DirectReg(Register::L))),
    (&[0x30, 0x05],             Instruction::JRcc(Condition::NotCarry, 5)),
    (&[0x31, 0x11, 0x11],       Instruction::LD(LoadTarget::DirectRegWord(RegisterPair::SP), LoadTarget::ImmediateWord(0x1111))),
    (&[0x34],                   Instruction::INC8(Target::IndirectReg(RegisterPair::HL))),
    (&[0x35],                   Instruction::DEC8(Target::IndirectReg(RegisterPair::HL))),
    (&[0x36, 0x77],             Instruction::LD(LoadTarget::IndirectRegByte(RegisterPair::HL), LoadTarget::ImmediateByte(0x77))),
    (&[0x37],                   Instruction::SCF),
    (&[0x38, 0xF9],             Instruction::JRcc(Condition::Carry, -7)),
    (&[0x3D],                   Instruction::DEC8(Target::DirectReg(Register::A))),
    (&[0x3E, 0x01],             Instruction::LD(LoadTarget::DirectRegByte(Register::A), LoadTarget::ImmediateByte(0x01))),

    (&[0x41],                   Instruction::LD(LoadTarget::DirectRegByte(Register::B), LoadTarget::DirectRegByte(Register::C))),
    (&[0x46],                   Instruction::LD(LoadTarget::DirectRegByte(Register::B), LoadTarget::IndirectRegByte(RegisterPair::HL))),
    (&[0x5A],                   Instruction::LD(LoadTarget::DirectRegByte(Register::E), LoadTarget::DirectRegByte(Register::D))),
    (&[0x70],                   Instruction::LD(LoadTarget::IndirectRegByte(RegisterPair::HL), LoadTarget::DirectRegByte(Register::B))),
    (&[0x76],                   Instruction::HALT),
    (&[0x7F],                   Instruction::LD(LoadTarget::DirectRegByte(Register::A), LoadTarget::DirectRegByte(Register::A))),

    (&[0x80],                   Instruction::ADDa(Target::DirectReg(Register::B))),
    (&[0x86],                   Instruction::ADDa(Target::IndirectReg(RegisterPair::HL))),
    (&[0x88],                   Instruction::ADCa(Target::DirectReg(Register::B))),
    (&[0x96],                   Instruction::SUB(Target::IndirectReg(RegisterPair::HL))),
    (&[0x9F],                   Instruction::SBCa(Target::DirectReg(Register::A))),
    (&[0xA1],                   Instruction::AND(Target::DirectReg(Register::C))),
    (&[0xA8],                   Instruction::XOR(Target::DirectReg(Register::B))),
    (&[0xB6],                   Instruction::OR(Target::IndirectReg(RegisterPair::HL))),
    (&[0xBB],                   Instruction::CP(Target::DirectReg(Register::E))),

    (&[0xC0],                   Instruction::RETcc(Condition::NotZero)),
    (&[0xC1],                   Instruction::POP(RegisterPair::BC)),
    (&[0xC2, 0x34, 0x12],       Instruction::JPcc(Condition::NotZero, 0x1234)),
    (&[0xC3, 0x34, 0x12],       Instruction::JP(0x1234)),
    (&[0xC4, 0x34, 0x12],       Instruction::CALLcc(Condition::NotZero, 0x1234)),
    (&[0xC5],                   Instruction::PUSH(RegisterPair::BC)),
    (&[0xC6, 0x10],             Instruction::ADDa(Target::Immediate(0x10))),
    (&[0xC8],                   Instruction::RETcc(Condition::Zero)),
    (&[0xC9],                   Instruction::RET),
    (&[0xCA, 0x0C, 0x00],       Instruction::JPcc(Condition::Zero, 0x000C)),
    (&[0xCD, 0x34, 0x12],       Instruction::CALL(0x1234)),
    (&[0xCE, 0x10],             Instruction::ADCa(Target::Immediate(0x10))),
    (&[0xD1],                   Instruction::POP(RegisterPair::DE)),
    (&[0xD2, 0x34, 0x12],       Instruction::JPcc(Condition::NotCarry, 0x1234)),
    (&[0xD6, 0x10],             Instruction::SUB(Target::Immediate(0x10))),
    (&[0xD8],                   Instruction::RETcc(Condition::Carry)),
    (&[0xD9],                   Instruction::EXX),
    (&[0xDA, 0x34, 0x12],       Instruction::JPcc(Condition::Carry, 0x1234)),
    (&[0xDE, 0x10],             Instruction::SBCa(Target::Immediate(0x10))),
    (&[0xE1],                   Instruction::POP(RegisterPair::HL)),
    (&[0xE2, 0x34, 0x12],       Instruction::JPcc(Condition::ParityOdd, 0x1234)),
    (&[0xE5],                   Instruction::PUSH(RegisterPair::HL)),
    (&[0xE6, 0x0F],             Instruction::AND(Target::Immediate(0x0F))),
    (&[0xEA, 0x34, 0x12],       Instruction::JPcc(Condition::ParityEven, 0x1234)),
    (&[0xEB],                   Instruction::EXhlde),
    (&[0xEE, 0xFF],             Instruction::XOR(Target::Immediate(0xFF))),
    (&[0xF1],                   Instruction::POP(RegisterPair::AF)),
    (&[0xF2, 0x34, 0x12],       Instruction::JPcc(Condition::Positive, 0x1234)),
    (&[0xF5],                   Instruction::PUSH(RegisterPair::AF)),
    (&[0xF6, 0x80],             Instruction::OR(Target::Immediate(0x80))),
    (&[0xFA, 0x34, 0x12],       Instruction::JPcc(Condition::Negative, 0x1234)),
    (&[0xFC, 0x34, 0x12],       Instruction::CALLcc(Condition::Negative, 0x1234)),
    (&[0xFE, 0x01],             Instruction::CP(Target::Immediate(0x01))),

    // The index-prefixed space.
    (&[0xDD, 0x21, 0xCD, 0xAB], Instruction::LD(LoadTarget::DirectRegWord(RegisterPair::IX), LoadTarget::ImmediateWord(0xABCD))),
    (&[0xFD, 0x21, 0xEF, 0xCD], Instruction::LD(LoadTarget::DirectRegWord(RegisterPair::IY), LoadTarget::ImmediateWord(0xCDEF))),
    (&[0xDD, 0x34, 0x05],       Instruction::INC8(Target::IndirectOffset(IndexRegister::IX, 5))),
    (&[0xFD, 0x35, 0xFB],       Instruction::DEC8(Target::IndirectOffset(IndexRegister::IY, -5))),
    (&[0xDD, 0x36, 0x05, 0xAA], Instruction::LD(LoadTarget::IndirectOffsetByte(IndexRegister::IX, 5), LoadTarget::ImmediateByte(0xAA))),
    (&[0xDD, 0x7E, 0x05],       Instruction::LD(LoadTarget::DirectRegByte(Register::A), LoadTarget::IndirectOffsetByte(IndexRegister::IX, 5))),
    (&[0xFD, 0x70, 0xFE],       Instruction::LD(LoadTarget::IndirectOffsetByte(IndexRegister::IY, -2), LoadTarget::DirectRegByte(Register::B))),
    (&[0xDD, 0x86, 0x05],       Instruction::ADDa(Target::IndirectOffset(IndexRegister::IX, 5))),
    (&[0xFD, 0x8E, 0x05],       Instruction::ADCa(Target::IndirectOffset(IndexRegister::IY, 5))),
    (&[0xFD, 0x96, 0x80],       Instruction::SUB(Target::IndirectOffset(IndexRegister::IY, -128))),
    (&[0xDD, 0xBE, 0x7F],       Instruction::CP(Target::IndirectOffset(IndexRegister::IX, 127))),

    // Encodings outside the implemented set decode as no-ops.
    (&[0x02],                   Instruction::NOP), // LD (BC),A
    (&[0x03],                   Instruction::NOP), // INC BC
    (&[0x07],                   Instruction::NOP), // RLCA
    (&[0x09],                   Instruction::NOP), // ADD HL,BC
    (&[0x10, 0x10],             Instruction::NOP), // DJNZ
    (&[0x2F],                   Instruction::NOP), // CPL
    (&[0xCB, 0x11],             Instruction::NOP), // bit-manipulation prefix
    (&[0xD3, 0x10],             Instruction::NOP), // OUT (n),A
    (&[0xE9],                   Instruction::NOP), // JP (HL)
    (&[0xED, 0xB0],             Instruction::NOP), // block-transfer prefix
    (&[0xF3],                   Instruction::NOP), // DI
    (&[0xF9],                   Instruction::NOP), // LD SP,HL
    (&[0xFF],                   Instruction::NOP), // RST 38h
    (&[0xDD, 0x76],             Instruction::NOP), // no HALT in the indexed space
    (&[0xDD, 0x80],             Instruction::NOP), // register-only ALU is undefined when prefixed
    (&[0xFD, 0xE5],             Instruction::NOP), // PUSH IY is outside the implemented subset
];

#[test]
fn unknown_opcode_leaves_operand_bytes_unconsumed() {
    // DJNZ is not implemented; its displacement byte must stay unconsumed.
    let mut cpu = Z80::new();
    cpu.load_at(0, &[0x10, 0x3C]).unwrap();
    cpu.step();
    assert_eq!(cpu.state.pc, 1);

    // The stranded operand then executes as its own instruction (INC A).
    cpu.step();
    assert_eq!(cpu.state.pc, 2);
    assert_eq!(cpu.state.get_register(Register::A), 1);
}

#[test]
fn unknown_prefixed_opcode_consumes_prefix_and_opcode_only() {
    let mut cpu = Z80::new();
    cpu.load_at(0, &[0xDD, 0x09]).unwrap(); // ADD IX,BC: not implemented
    cpu.step();
    assert_eq!(cpu.state.pc, 2);
}

#[test]
fn decoder_tracks_instruction_extents() {
    let mut cpu = Z80::new();
    cpu.load_at(0, &[0x00, 0xDD, 0x36, 0x05, 0xAA]).unwrap();
    cpu.step();
    assert_eq!((cpu.decoder.start, cpu.decoder.end), (0, 1));
    cpu.step();
    assert_eq!((cpu.decoder.start, cpu.decoder.end), (1, 5));
}
