//! Register maps for the PMIF software interface and the SPMI master.
//!
//! Every chip variant supplies an offset for every logical register; the
//! lookups are exhaustive matches so a missing entry fails to compile.

use std::fmt;

use bitflags::bitflags;

/// Software interface FSM is idle and accepts a command
pub const SWINF_IDLE: u32 = 0x00;
/// Read data is valid and waits for the ready/clear write
pub const SWINF_WFVLDCLR: u32 = 0x06;

const SWINF_SHIFT: u32 = 1;
const SWINF_MASK: u32 = 0x7;

/// Extract the 3-bit FSM state from a `PMIF_SWINF_n_STA` value.
#[inline]
pub const fn swinf_state(sta: u32) -> u32 {
    (sta >> SWINF_SHIFT) & SWINF_MASK
}

bitflags! {
    /// `SPMI_OP_ST_STA`
    pub struct OpStatus: u32 {
        const BUSY = 1 << 0;
    }
}

bitflags! {
    /// `SPMI_REC_CTRL`; writing both bits acknowledges and clears the trace
    /// records.
    pub struct RecordCtrl: u32 {
        const CLEAR_RECORD = 1 << 0;
        const CLEAR_DECODE = 1 << 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PmifReg {
    InitDone,
    InfEn,
    ArbEn,
    CmdIssueEn,
    TimerCtrl,
    SpiModeCtrl,
    IrqEventEn0,
    IrqFlag0,
    IrqClr0,
    IrqEventEn1,
    IrqFlag1,
    IrqClr1,
    IrqEventEn2,
    IrqFlag2,
    IrqClr2,
    IrqEventEn3,
    IrqFlag3,
    IrqClr3,
    IrqEventEn4,
    IrqFlag4,
    IrqClr4,
    WdtEventEn0,
    WdtFlag0,
    WdtEventEn1,
    WdtFlag1,
    Swinf0Sta,
    Swinf0Wdata,
    Swinf0Rdata,
    Swinf0Acc,
    Swinf0VldClr,
    Swinf1Sta,
    Swinf1Wdata,
    Swinf1Rdata,
    Swinf1Acc,
    Swinf1VldClr,
    Swinf2Sta,
    Swinf2Wdata,
    Swinf2Rdata,
    Swinf2Acc,
    Swinf2VldClr,
    Swinf3Sta,
    Swinf3Wdata,
    Swinf3Rdata,
    Swinf3Acc,
    Swinf3VldClr,
}

impl PmifReg {
    pub const ALL: [PmifReg; 45] = {
        use PmifReg::*;
        [
            InitDone, InfEn, ArbEn, CmdIssueEn, TimerCtrl, SpiModeCtrl,
            IrqEventEn0, IrqFlag0, IrqClr0,
            IrqEventEn1, IrqFlag1, IrqClr1,
            IrqEventEn2, IrqFlag2, IrqClr2,
            IrqEventEn3, IrqFlag3, IrqClr3,
            IrqEventEn4, IrqFlag4, IrqClr4,
            WdtEventEn0, WdtFlag0, WdtEventEn1, WdtFlag1,
            Swinf0Sta, Swinf0Wdata, Swinf0Rdata, Swinf0Acc, Swinf0VldClr,
            Swinf1Sta, Swinf1Wdata, Swinf1Rdata, Swinf1Acc, Swinf1VldClr,
            Swinf2Sta, Swinf2Wdata, Swinf2Rdata, Swinf2Acc, Swinf2VldClr,
            Swinf3Sta, Swinf3Wdata, Swinf3Rdata, Swinf3Acc, Swinf3VldClr,
        ]
    };
}

/// SPMI master registers present on every supported variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpmiReg {
    OpStCtrl,
    GrpIdEn,
    OpStSta,
    MstSampl,
    MstReqEn,
    RecCtrl,
    Rec0,
    Rec1,
    Rec2,
    Rec3,
    Rec4,
    MstDbg,
}

impl SpmiReg {
    pub const ALL: [SpmiReg; 12] = {
        use SpmiReg::*;
        [
            OpStCtrl, GrpIdEn, OpStSta, MstSampl, MstReqEn, RecCtrl,
            Rec0, Rec1, Rec2, Rec3, Rec4, MstDbg,
        ]
    };

    /// Trace records drained after an SPMI master event.
    pub const RECORDS: [SpmiReg; 5] = [
        SpmiReg::Rec0,
        SpmiReg::Rec1,
        SpmiReg::Rec2,
        SpmiReg::Rec3,
        SpmiReg::Rec4,
    ];
}

/// SPMI master registers that only exist on the MT8188 class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpmiRcsReg {
    MstRcsCtrl,
    SlvEint0To3,
    SlvEint4To7,
    SlvEint8ToB,
    SlvEintCToF,
    RecCmdDec,
    DecDbg,
}

impl SpmiRcsReg {
    pub const ALL: [SpmiRcsReg; 7] = {
        use SpmiRcsReg::*;
        [MstRcsCtrl, SlvEint0To3, SlvEint4To7, SlvEint8ToB, SlvEintCToF, RecCmdDec, DecDbg]
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChipVariant {
    /// MT6873 and derivatives
    Mt6873,
    /// MT8195, MT8188
    Mt8188,
}

impl ChipVariant {
    pub fn from_compatible(compatible: &str) -> Option<Self> {
        match compatible {
            "mediatek,mt6873-spmi" => Some(ChipVariant::Mt6873),
            "mediatek,mt8195-spmi" | "mediatek,mt8188-spmi" => Some(ChipVariant::Mt8188),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ChipVariant::Mt6873 => "mt6873",
            ChipVariant::Mt8188 => "mt8188",
        }
    }

    /// Software channel reserved for the application processor.
    pub const fn default_soc_chan(self) -> u32 {
        match self {
            ChipVariant::Mt6873 | ChipVariant::Mt8188 => 2,
        }
    }

    pub const fn pmif_offset(self, reg: PmifReg) -> usize {
        match self {
            ChipVariant::Mt6873 => mt6873_pmif(reg),
            ChipVariant::Mt8188 => mt8188_pmif(reg),
        }
    }

    pub const fn spmi_offset(self, reg: SpmiReg) -> usize {
        use SpmiReg::*;
        // Both generations share the common part of the SPMI master map
        match reg {
            OpStCtrl => 0x0000,
            GrpIdEn => 0x0004,
            OpStSta => 0x0008,
            MstSampl => 0x000C,
            MstReqEn => 0x0010,
            RecCtrl => 0x0040,
            Rec0 => 0x0044,
            Rec1 => 0x0048,
            Rec2 => 0x004C,
            Rec3 => 0x0050,
            Rec4 => 0x0054,
            MstDbg => 0x00FC,
        }
    }

    pub const fn spmi_rcs_offset(self, reg: SpmiRcsReg) -> Option<usize> {
        use SpmiRcsReg::*;
        match self {
            ChipVariant::Mt6873 => None,
            ChipVariant::Mt8188 => Some(match reg {
                MstRcsCtrl => 0x0014,
                SlvEint0To3 => 0x0020,
                SlvEint4To7 => 0x0024,
                SlvEint8ToB => 0x0028,
                SlvEintCToF => 0x002C,
                RecCmdDec => 0x005C,
                DecDbg => 0x00F8,
            }),
        }
    }

    /// Bytes of the PMIF window touched by this variant.
    pub fn pmif_span(self) -> usize {
        PmifReg::ALL
            .iter()
            .map(|&reg| self.pmif_offset(reg) + 4)
            .max()
            .unwrap_or(0)
    }

    /// Bytes of the SPMI master window touched by this variant.
    pub fn spmi_span(self) -> usize {
        let common = SpmiReg::ALL.iter().map(|&reg| self.spmi_offset(reg) + 4);
        let rcs = SpmiRcsReg::ALL
            .iter()
            .filter_map(|&reg| self.spmi_rcs_offset(reg))
            .map(|offset| offset + 4);
        common.chain(rcs).max().unwrap_or(0)
    }
}

impl fmt::Display for ChipVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn mt6873_pmif(reg: PmifReg) -> usize {
    use PmifReg::*;
    match reg {
        InitDone => 0x0000,
        InfEn => 0x0024,
        ArbEn => 0x0150,
        CmdIssueEn => 0x03B4,
        TimerCtrl => 0x03E0,
        SpiModeCtrl => 0x0400,
        IrqEventEn0 => 0x0418,
        IrqFlag0 => 0x0420,
        IrqClr0 => 0x0424,
        IrqEventEn1 => 0x0428,
        IrqFlag1 => 0x0430,
        IrqClr1 => 0x0434,
        IrqEventEn2 => 0x0438,
        IrqFlag2 => 0x0440,
        IrqClr2 => 0x0444,
        IrqEventEn3 => 0x0448,
        IrqFlag3 => 0x0450,
        IrqClr3 => 0x0454,
        IrqEventEn4 => 0x0458,
        IrqFlag4 => 0x0460,
        IrqClr4 => 0x0464,
        WdtEventEn0 => 0x046C,
        WdtFlag0 => 0x0470,
        WdtEventEn1 => 0x0474,
        WdtFlag1 => 0x0478,
        Swinf0Acc => 0x0C00,
        Swinf0Wdata => 0x0C04,
        Swinf0Rdata => 0x0C14,
        Swinf0VldClr => 0x0C24,
        Swinf0Sta => 0x0C28,
        Swinf1Acc => 0x0C40,
        Swinf1Wdata => 0x0C44,
        Swinf1Rdata => 0x0C54,
        Swinf1VldClr => 0x0C64,
        Swinf1Sta => 0x0C68,
        Swinf2Acc => 0x0C80,
        Swinf2Wdata => 0x0C84,
        Swinf2Rdata => 0x0C94,
        Swinf2VldClr => 0x0CA4,
        Swinf2Sta => 0x0CA8,
        Swinf3Acc => 0x0CC0,
        Swinf3Wdata => 0x0CC4,
        Swinf3Rdata => 0x0CD4,
        Swinf3VldClr => 0x0CE4,
        Swinf3Sta => 0x0CE8,
    }
}

const fn mt8188_pmif(reg: PmifReg) -> usize {
    use PmifReg::*;
    match reg {
        InitDone => 0x0000,
        InfEn => 0x0024,
        ArbEn => 0x0150,
        CmdIssueEn => 0x03B8,
        TimerCtrl => 0x03E4,
        SpiModeCtrl => 0x0408,
        IrqEventEn0 => 0x0420,
        IrqFlag0 => 0x0428,
        IrqClr0 => 0x042C,
        IrqEventEn1 => 0x0430,
        IrqFlag1 => 0x0438,
        IrqClr1 => 0x043C,
        IrqEventEn2 => 0x0440,
        IrqFlag2 => 0x0448,
        IrqClr2 => 0x044C,
        IrqEventEn3 => 0x0450,
        IrqFlag3 => 0x0458,
        IrqClr3 => 0x045C,
        IrqEventEn4 => 0x0460,
        IrqFlag4 => 0x0468,
        IrqClr4 => 0x046C,
        WdtEventEn0 => 0x0474,
        WdtFlag0 => 0x0478,
        WdtEventEn1 => 0x047C,
        WdtFlag1 => 0x0480,
        Swinf0Acc => 0x0800,
        Swinf0Wdata => 0x0804,
        Swinf0Rdata => 0x0814,
        Swinf0VldClr => 0x0824,
        Swinf0Sta => 0x0828,
        Swinf1Acc => 0x0840,
        Swinf1Wdata => 0x0844,
        Swinf1Rdata => 0x0854,
        Swinf1VldClr => 0x0864,
        Swinf1Sta => 0x0868,
        Swinf2Acc => 0x0880,
        Swinf2Wdata => 0x0884,
        Swinf2Rdata => 0x0894,
        Swinf2VldClr => 0x08A4,
        Swinf2Sta => 0x08A8,
        Swinf3Acc => 0x08C0,
        Swinf3Wdata => 0x08C4,
        Swinf3Rdata => 0x08D4,
        Swinf3VldClr => 0x08E4,
        Swinf3Sta => 0x08E8,
    }
}

/// The five registers of one software interface channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRegs {
    pub sta: PmifReg,
    pub wdata: PmifReg,
    pub rdata: PmifReg,
    pub send: PmifReg,
    pub rdy: PmifReg,
}

impl ChannelRegs {
    pub const COUNT: u32 = 4;

    pub const fn new(chan: u32) -> Option<Self> {
        use PmifReg::*;
        let (sta, wdata, rdata, send, rdy) = match chan {
            0 => (Swinf0Sta, Swinf0Wdata, Swinf0Rdata, Swinf0Acc, Swinf0VldClr),
            1 => (Swinf1Sta, Swinf1Wdata, Swinf1Rdata, Swinf1Acc, Swinf1VldClr),
            2 => (Swinf2Sta, Swinf2Wdata, Swinf2Rdata, Swinf2Acc, Swinf2VldClr),
            3 => (Swinf3Sta, Swinf3Wdata, Swinf3Rdata, Swinf3Acc, Swinf3VldClr),
            _ => return None,
        };
        Some(Self {
            sta,
            wdata,
            rdata,
            send,
            rdy,
        })
    }
}

/// One of the five PMIF interrupt event banks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IrqBank {
    Event0,
    Event1,
    Event2,
    Event3,
    Event4,
}

impl IrqBank {
    pub const ALL: [IrqBank; 5] = [
        IrqBank::Event0,
        IrqBank::Event1,
        IrqBank::Event2,
        IrqBank::Event3,
        IrqBank::Event4,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn event_en(self) -> PmifReg {
        match self {
            IrqBank::Event0 => PmifReg::IrqEventEn0,
            IrqBank::Event1 => PmifReg::IrqEventEn1,
            IrqBank::Event2 => PmifReg::IrqEventEn2,
            IrqBank::Event3 => PmifReg::IrqEventEn3,
            IrqBank::Event4 => PmifReg::IrqEventEn4,
        }
    }

    pub const fn flag(self) -> PmifReg {
        match self {
            IrqBank::Event0 => PmifReg::IrqFlag0,
            IrqBank::Event1 => PmifReg::IrqFlag1,
            IrqBank::Event2 => PmifReg::IrqFlag2,
            IrqBank::Event3 => PmifReg::IrqFlag3,
            IrqBank::Event4 => PmifReg::IrqFlag4,
        }
    }

    pub const fn clr(self) -> PmifReg {
        match self {
            IrqBank::Event0 => PmifReg::IrqClr0,
            IrqBank::Event1 => PmifReg::IrqClr1,
            IrqBank::Event2 => PmifReg::IrqClr2,
            IrqBank::Event3 => PmifReg::IrqClr3,
            IrqBank::Event4 => PmifReg::IrqClr4,
        }
    }
}

impl fmt::Display for IrqBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event_{}", self.index())
    }
}
