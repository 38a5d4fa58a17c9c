#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    NotZero,
    Zero,
    NotCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Positive,
    Negative,
}

/// Storage index of an 8-bit register within the register file.  The
/// discriminants are array positions, not instruction encodings; the
/// decoder maps the 3-bit r-field onto these separately.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    B = 0,
    C = 1,
    D = 2,
    E = 3,
    H = 4,
    L = 5,
    A = 6,
    F = 7,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegisterPair {
    BC,
    DE,
    HL,
    AF,
    SP,
    IX,
    IY,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IndexRegister {
    IX,
    IY,
}

/// An 8-bit ALU operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    DirectReg(Register),
    IndirectReg(RegisterPair),
    IndirectOffset(IndexRegister, i8),
    Immediate(u8),
}

/// Source or destination of a load.  Word-sized variants only ever carry
/// register pairs or 16-bit immediates; memory operands are byte-sized.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadTarget {
    DirectRegByte(Register),
    DirectRegWord(RegisterPair),
    IndirectRegByte(RegisterPair),
    IndirectOffsetByte(IndexRegister, i8),
    ImmediateByte(u8),
    ImmediateWord(u16),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    ADCa(Target),
    ADDa(Target),
    AND(Target),
    CALL(u16),
    CALLcc(Condition, u16),
    CP(Target),
    DAA,
    DEC8(Target),
    EXX,
    EXafaf,
    EXhlde,
    HALT,
    INC8(Target),
    JP(u16),
    JPcc(Condition, u16),
    JR(i8),
    JRcc(Condition, i8),
    LD(LoadTarget, LoadTarget),
    NOP,
    OR(Target),
    POP(RegisterPair),
    PUSH(RegisterPair),
    RET,
    RETcc(Condition),
    SBCa(Target),
    SCF,
    SUB(Target),
    XOR(Target),
}
