use std::sync::Arc;
use std::thread;

use pmifd::{ChipVariant, IrqBank, SpmiController};

mod sim;

const ROUNDS: usize = 200;

#[test]
fn transactions_never_overlap() {
    let h = sim::probe(ChipVariant::Mt8188);
    {
        let mut s = h.sim.state();
        s.latency = 3;
        s.rdata = 0x42;
    }
    let pmif = Arc::new(h.pmif);

    let writer = {
        let pmif = pmif.clone();
        thread::spawn(move || {
            for i in 0..ROUNDS {
                pmif.ext_register_writel(0x4, 0x0200, &[i as u8]).unwrap();
            }
        })
    };
    let reader = {
        let pmif = pmif.clone();
        thread::spawn(move || {
            for _ in 0..ROUNDS {
                let mut buf = [0];
                pmif.ext_register_readl(0x4, 0x0200, &mut buf).unwrap();
                assert_eq!(buf, [0x42]);
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();

    let s = h.sim.state();
    assert_eq!(s.overlaps, 0);
    assert_eq!(s.commands.len(), 2 * ROUNDS);
    assert_eq!(s.wdata.len(), ROUNDS);
    assert_eq!(s.rdy_writes as usize, ROUNDS);
}

#[test]
fn interrupts_interleave_with_transactions() {
    let h = sim::probe(ChipVariant::Mt6873);
    h.sim.state().latency = 2;
    let pmif = Arc::new(h.pmif);
    let sim = h.sim.clone();

    let irq = {
        let pmif = pmif.clone();
        thread::spawn(move || {
            for _ in 0..ROUNDS {
                sim.raise(IrqBank::Event3, 1 << 6);
                pmif.handle_irq(IrqBank::Event3);
            }
        })
    };
    for _ in 0..ROUNDS {
        let mut buf = [0; 2];
        pmif.ext_register_read(0x1, 0x10, &mut buf).unwrap();
    }
    irq.join().unwrap();

    let s = h.sim.state();
    assert_eq!(s.overlaps, 0);
    assert_eq!(s.commands.len(), ROUNDS);
    assert_eq!(pmif.irq_stats().handled(IrqBank::Event3) as usize, ROUNDS);
    assert!(!pmif.wakeup_source().is_active());
}
