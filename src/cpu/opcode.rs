/*!
The instruction opcode set, as a tagged sum rather than the historical
source's 64-entry function-pointer table. A `match` over this enum gives
the compiler exhaustiveness checking that a table of function pointers
cannot.
*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    And,
    Or,
    Not,
    Xor,
    Add,
    Sub,
    Mul,
    Div,
    Compare,
    Shiftl,
    Ashiftr,
    Load,
    Loadr,
    Loada,
    Store,
    Storer,
    Jump,
    Branch,
    Call,
    Callr,
    Jumpr,
    Trap,
    Returni,
    Nop,
}

impl Opcode {
    /// Decode the 6-bit opcode field. Unknown values (0x17..0x3F) collapse
    /// to `Nop`, matching the "undefined opcode is silently a NOP" policy.
    pub fn from_bits(bits: u32) -> Opcode {
        match bits & 0x3F {
            0x00 => Opcode::And,
            0x01 => Opcode::Or,
            0x02 => Opcode::Not,
            0x03 => Opcode::Xor,
            0x04 => Opcode::Add,
            0x05 => Opcode::Sub,
            0x06 => Opcode::Mul,
            0x07 => Opcode::Div,
            0x08 => Opcode::Compare,
            0x09 => Opcode::Shiftl,
            0x0A => Opcode::Ashiftr,
            0x0B => Opcode::Load,
            0x0C => Opcode::Loadr,
            0x0D => Opcode::Loada,
            0x0E => Opcode::Store,
            0x0F => Opcode::Storer,
            0x10 => Opcode::Jump,
            0x11 => Opcode::Branch,
            0x12 => Opcode::Call,
            0x13 => Opcode::Callr,
            0x14 => Opcode::Jumpr,
            0x15 => Opcode::Trap,
            0x16 => Opcode::Returni,
            _ => Opcode::Nop,
        }
    }

    /// The 6-bit opcode field this variant decodes from. `Nop` returns its
    /// canonical reserved value (`0x17`); any byte in `0x17..=0x3F` would
    /// also decode to `Nop`, but this is the one this encoder emits.
    pub fn to_bits(self) -> u32 {
        match self {
            Opcode::And => 0x00,
            Opcode::Or => 0x01,
            Opcode::Not => 0x02,
            Opcode::Xor => 0x03,
            Opcode::Add => 0x04,
            Opcode::Sub => 0x05,
            Opcode::Mul => 0x06,
            Opcode::Div => 0x07,
            Opcode::Compare => 0x08,
            Opcode::Shiftl => 0x09,
            Opcode::Ashiftr => 0x0A,
            Opcode::Load => 0x0B,
            Opcode::Loadr => 0x0C,
            Opcode::Loada => 0x0D,
            Opcode::Store => 0x0E,
            Opcode::Storer => 0x0F,
            Opcode::Jump => 0x10,
            Opcode::Branch => 0x11,
            Opcode::Call => 0x12,
            Opcode::Callr => 0x13,
            Opcode::Jumpr => 0x14,
            Opcode::Trap => 0x15,
            Opcode::Returni => 0x16,
            Opcode::Nop => 0x17,
        }
    }

    /// Whether this opcode updates the CCR as part of its execution.
    pub fn is_alu_producing(self) -> bool {
        matches!(
            self,
            Opcode::And
                | Opcode::Or
                | Opcode::Not
                | Opcode::Xor
                | Opcode::Add
                | Opcode::Sub
                | Opcode::Shiftl
                | Opcode::Ashiftr
        )
    }

    /// Whether this opcode requires a MEMORY1/MEMORY2 bus transaction.
    pub fn is_memory_op(self) -> bool {
        matches!(
            self,
            Opcode::Load | Opcode::Loadr | Opcode::Store | Opcode::Storer
        )
    }

    /// Whether this opcode is a store (commits on the bus write, skips EXECUTE).
    pub fn is_store(self) -> bool {
        matches!(self, Opcode::Store | Opcode::Storer)
    }

    /// Whether this opcode addresses memory PC-relative (vs. base+offset).
    pub fn is_pc_relative_memory(self) -> bool {
        matches!(self, Opcode::Load | Opcode::Store)
    }

    /// Whether this opcode computes an effective address without touching
    /// the bus (load-effective-address).
    pub fn is_load_effective_address(self) -> bool {
        matches!(self, Opcode::Loada)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_opcodes_round_trip() {
        let known = [
            (0x00u32, Opcode::And),
            (0x01, Opcode::Or),
            (0x02, Opcode::Not),
            (0x03, Opcode::Xor),
            (0x04, Opcode::Add),
            (0x05, Opcode::Sub),
            (0x09, Opcode::Shiftl),
            (0x0A, Opcode::Ashiftr),
            (0x0B, Opcode::Load),
            (0x0C, Opcode::Loadr),
            (0x0D, Opcode::Loada),
            (0x0E, Opcode::Store),
            (0x0F, Opcode::Storer),
            (0x10, Opcode::Jump),
            (0x11, Opcode::Branch),
            (0x12, Opcode::Call),
            (0x13, Opcode::Callr),
            (0x14, Opcode::Jumpr),
            (0x15, Opcode::Trap),
            (0x16, Opcode::Returni),
        ];
        for (bits, op) in known {
            assert_eq!(Opcode::from_bits(bits), op);
        }
    }

    #[test]
    fn unknown_opcodes_are_nop() {
        for bits in 0x17..=0x3Fu32 {
            assert_eq!(Opcode::from_bits(bits), Opcode::Nop);
        }
    }

    #[test]
    fn to_bits_round_trips_through_from_bits() {
        let all = [
            Opcode::And,
            Opcode::Or,
            Opcode::Not,
            Opcode::Xor,
            Opcode::Add,
            Opcode::Sub,
            Opcode::Mul,
            Opcode::Div,
            Opcode::Compare,
            Opcode::Shiftl,
            Opcode::Ashiftr,
            Opcode::Load,
            Opcode::Loadr,
            Opcode::Loada,
            Opcode::Store,
            Opcode::Storer,
            Opcode::Jump,
            Opcode::Branch,
            Opcode::Call,
            Opcode::Callr,
            Opcode::Jumpr,
            Opcode::Trap,
            Opcode::Returni,
        ];
        for op in all {
            assert_eq!(Opcode::from_bits(op.to_bits()), op);
        }
    }
}
