//! Bill type masks
//!
//! CCNET devices address denominations by slot number. Which bill sits in
//! which slot is decided by the acceptor firmware, so the mask here only
//! names slots. For example a firmware for Ukrainian hryvnia maps 5 UAH to
//! slot 2 and 10 UAH to slot 3.

use std::fmt;

bitflags::bitflags! {
    /// Set of enabled denomination slots
    ///
    /// # Examples
    ///
    /// ```
    /// use ccnet_types::BillTypes;
    ///
    /// let bills = BillTypes::SLOT_2 | BillTypes::SLOT_3;
    /// assert_eq!(bills.bits(), 0x0C);
    /// assert_eq!(BillTypes::from(0x0Cu8), bills);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BillTypes: u8 {
        const SLOT_0 = 1 << 0;
        const SLOT_1 = 1 << 1;
        const SLOT_2 = 1 << 2;
        const SLOT_3 = 1 << 3;
        const SLOT_4 = 1 << 4;
        const SLOT_5 = 1 << 5;
        const SLOT_6 = 1 << 6;
        const SLOT_7 = 1 << 7;
    }
}

impl BillTypes {
    /// Mask for a single slot, `None` if the slot is out of range
    pub fn slot(index: u8) -> Option<Self> {
        1u8.checked_shl(u32::from(index)).map(Self::from_bits_retain)
    }

    /// Indices of enabled slots, lowest first
    pub fn slots(self) -> impl Iterator<Item = u8> {
        (0..8).filter(move |i| self.bits() & (1 << i) != 0)
    }
}

impl From<u8> for BillTypes {
    fn from(bits: u8) -> Self {
        Self::from_bits_retain(bits)
    }
}

impl From<BillTypes> for u8 {
    fn from(bills: BillTypes) -> u8 {
        bills.bits()
    }
}

impl fmt::Display for BillTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.bits())
    }
}
