//! Bit ranges inside a register word.
//!
//! Every field is described by the register it lives in, its bit offset, its width and whether
//! the value is two's complement. Packing and unpacking are plain mask/shift operations over the
//! `u32` shadow word, so the layout never depends on struct ordering.

/// Semantic field names shared by all chip variants.
///
/// A variant maps each name it supports onto a concrete [`Field`]; names a chip does not have are
/// simply absent from its table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldId {
    // GCONF
    IScaleAnalog,
    InternalRsense,
    EnSpreadCycle,
    Extcap,
    Shaft,
    IndexOtpw,
    IndexStep,
    PdnDisable,
    MstepRegSelect,
    MultistepFilt,
    TestMode,

    // GSTAT
    GstatReset,
    GstatDrvErr,
    GstatUvCp,

    Ifcnt,
    SendDelay,
    Version,

    // IHOLD_IRUN
    Ihold,
    Irun,
    IholdDelay,

    TpowerDown,
    Tstep,
    TpwmThrs,
    TcoolThrs,
    Vactual,
    SgThrs,
    SgResult,

    // COOLCONF
    Semin,
    Seup,
    Semax,
    Sedn,
    Seimin,

    Mscnt,

    // CHOPCONF
    Toff,
    EnableDrv,
    Hstrt,
    Hend,
    Tbl,
    Vsense,
    Mres,
    Intpol,
    Dedge,
    Diss2g,
    Diss2vs,

    // DRV_STATUS
    Otpw,
    Ot,
    S2ga,
    S2gb,
    S2vsa,
    S2vsb,
    Ola,
    Olb,
    T120,
    T150,
    CsActual,
    Stealth,
    Stst,

    // PWMCONF
    PwmOfs,
    PwmGrad,
    PwmFreq,
    PwmAutoscale,
    PwmAutograd,
    Freewheel,
    PwmReg,
    PwmLim,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    pub addr: u8,
    pub offset: u8,
    pub width: u8,
    pub signed: bool,
}

impl Field {
    pub const fn new(addr: u8, offset: u8, width: u8) -> Self {
        Field { addr, offset, width, signed: false }
    }

    pub const fn signed(addr: u8, offset: u8, width: u8) -> Self {
        Field { addr, offset, width, signed: true }
    }

    pub const fn bit(addr: u8, offset: u8) -> Self {
        Field::new(addr, offset, 1)
    }

    /// Largest value the field can hold, right aligned.
    pub const fn max(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// The field's bits in place inside the register word.
    pub const fn mask(&self) -> u32 {
        self.max() << self.offset
    }

    /// Returns `word` with this field replaced by `value`.
    ///
    /// Bits of `value` above the field width are dropped, like the chip does.
    pub const fn pack(&self, word: u32, value: u32) -> u32 {
        (word & !self.mask()) | ((value & self.max()) << self.offset)
    }

    pub const fn pack_signed(&self, word: u32, value: i32) -> u32 {
        self.pack(word, value as u32)
    }

    pub const fn pack_bool(&self, word: u32, value: bool) -> u32 {
        self.pack(word, value as u32)
    }

    pub const fn unpack(&self, word: u32) -> u32 {
        (word & self.mask()) >> self.offset
    }

    /// Sign extended value; unsigned fields come back unchanged.
    pub const fn unpack_signed(&self, word: u32) -> i32 {
        let raw = self.unpack(word);
        if !self.signed || self.width >= 32 {
            return raw as i32;
        }
        let shift = 32 - self.width as u32;
        ((raw << shift) as i32) >> shift
    }

    pub const fn unpack_bool(&self, word: u32) -> bool {
        self.unpack(word) != 0
    }

    pub const fn overlaps(&self, other: &Field) -> bool {
        self.addr == other.addr && (self.mask() & other.mask()) != 0
    }
}

// Sanity Checks
// --------------------------------------------------------

#[test]
fn test_pack_unpack_round_trip() {
    let f = Field::new(0x10, 8, 5);
    for v in 0..=f.max() {
        assert_eq!(f.unpack(f.pack(0xFFFF_FFFF, v)), v);
        assert_eq!(f.unpack(f.pack(0, v)), v);
    }
}

#[test]
fn test_pack_leaves_other_bits_alone() {
    let f = Field::new(0x6C, 24, 4);
    let word = 0x1000_0053;
    let packed = f.pack(word, 0b0110);
    assert_eq!(packed & !f.mask(), word & !f.mask());
    assert_eq!(packed, 0x1600_0053);
}

#[test]
fn test_pack_truncates_wide_values() {
    let f = Field::new(0x10, 0, 5);
    assert_eq!(f.pack(0, 0x3F), 0x1F);
    assert_eq!(f.pack(0xFFFF_FF00, 0x120), 0xFFFF_FF00);

    let flag = Field::bit(0x00, 2);
    assert_eq!(flag.pack(0, 2), 0);
    assert_eq!(flag.pack(0, 3), 0b100);
}

#[test]
fn test_full_width_field() {
    let f = Field::new(0x6F, 0, 32);
    assert_eq!(f.mask(), u32::MAX);
    assert_eq!(f.pack(0x1234, 0xDEAD_BEEF), 0xDEAD_BEEF);
    assert_eq!(f.unpack(0xDEAD_BEEF), 0xDEAD_BEEF);
}

#[test]
fn test_signed_field() {
    let f = Field::signed(0x22, 0, 24);
    let w = f.pack_signed(0, -100);
    assert_eq!(w, 0x00FF_FF9C);
    assert_eq!(f.unpack_signed(w), -100);
    assert_eq!(f.unpack_signed(f.pack_signed(0, 4000)), 4000);
}

#[test]
fn test_overlap() {
    let a = Field::new(0x10, 0, 5);
    let b = Field::new(0x10, 8, 5);
    let c = Field::new(0x10, 4, 2);
    assert!(!a.overlaps(&b));
    assert!(a.overlaps(&c));
    assert!(!a.overlaps(&Field::new(0x11, 0, 5)));
}
