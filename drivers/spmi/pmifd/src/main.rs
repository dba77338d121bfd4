use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use common::io::MmioRegion;
use log::info;

use pmifd::opcode::{
    SPMI_CMD_EXT_READL, SPMI_CMD_EXT_WRITEL, SPMI_CMD_RESET, SPMI_CMD_SHUTDOWN, SPMI_CMD_SLEEP,
    SPMI_CMD_WAKEUP,
};
use pmifd::{Clock, FixedClock, IrqBank, IrqReturn, Pmif, PmifConfig, SpmiController};

fn parse_int(value: &str) -> Result<u64> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.with_context(|| format!("expected an integer, got {value:?}"))
}

fn arg_int(matches: &ArgMatches, name: &str) -> Result<Option<u64>> {
    matches.value_of(name).map(parse_int).transpose()
}

fn required_int(matches: &ArgMatches, name: &str) -> Result<u64> {
    arg_int(matches, name)?.ok_or_else(|| anyhow!("missing argument {name}"))
}

fn narrow<T: TryFrom<u64>>(value: u64, name: &str) -> Result<T> {
    T::try_from(value).map_err(|_| anyhow!("{name} {value:#x} is out of range"))
}

fn bus_command(name: &str) -> Result<u8> {
    Ok(match name {
        "reset" => SPMI_CMD_RESET,
        "sleep" => SPMI_CMD_SLEEP,
        "shutdown" => SPMI_CMD_SHUTDOWN,
        "wakeup" => SPMI_CMD_WAKEUP,
        other => narrow(parse_int(other)?, "opcode")?,
    })
}

/// Extended long opcode for `len` bytes; the low bits carry the byte count.
fn default_opcode(base: u8, len: usize) -> u8 {
    base | (len.saturating_sub(1) as u8 & 0x7)
}

fn probe(matches: &ArgMatches) -> Result<Pmif> {
    let compatible = matches
        .value_of("COMPATIBLE")
        .expect("expected the required arg COMPATIBLE to exist");
    let mut config = PmifConfig::from_compatible(compatible)?;
    if let Some(soc_chan) = arg_int(matches, "SOC_CHAN")? {
        config = config.with_soc_chan(narrow(soc_chan, "soc-chan")?)?;
    }
    if let Some(timeout) = arg_int(matches, "TIMEOUT_US")? {
        config = config.with_poll_timeout(Duration::from_micros(timeout));
    }

    let pmif_base = narrow(required_int(matches, "PMIF_BASE")?, "pmif-base")?;
    let spmimst_base = narrow(required_int(matches, "SPMIMST_BASE")?, "spmimst-base")?;

    let pmif = MmioRegion::new(pmif_base, config.variant.pmif_span())
        .map_err(|err| anyhow!("failed to map pmif registers at {pmif_base:#x}: {err}"))?;
    let spmimst = MmioRegion::new(spmimst_base, config.variant.spmi_span())
        .map_err(|err| anyhow!("failed to map spmimst registers at {spmimst_base:#x}: {err}"))?;

    // Clocks are left running by the bootloader
    let clocks = pmifd::PMIF_CLOCK_NAMES
        .iter()
        .map(|&name| Box::new(FixedClock::new(name)) as Box<dyn Clock>)
        .collect();

    Pmif::probe(&config, Box::new(pmif), Box::new(spmimst), clocks)
        .context("failed to probe arbiter")
}

fn read(pmif: &Pmif, matches: &ArgMatches) -> Result<()> {
    let sid = narrow(required_int(matches, "SID")?, "sid")?;
    let addr = narrow(required_int(matches, "ADDR")?, "addr")?;
    let len: usize = narrow(required_int(matches, "LEN")?, "len")?;
    let opc = match arg_int(matches, "OPCODE")? {
        Some(opc) => narrow(opc, "opcode")?,
        None => default_opcode(SPMI_CMD_EXT_READL, len),
    };

    let mut buf = vec![0; len];
    pmif.read_cmd(opc, sid, addr, &mut buf)
        .with_context(|| format!("read of sid {sid:#x} addr {addr:#06x} failed"))?;

    let hex: Vec<String> = buf.iter().map(|b| format!("{b:02x}")).collect();
    println!("{}", hex.join(" "));
    Ok(())
}

fn write(pmif: &Pmif, matches: &ArgMatches) -> Result<()> {
    let sid = narrow(required_int(matches, "SID")?, "sid")?;
    let addr = narrow(required_int(matches, "ADDR")?, "addr")?;
    let data = matches
        .values_of("DATA")
        .expect("expected the required arg DATA to exist")
        .map(|value| narrow::<u8>(parse_int(value)?, "data"))
        .collect::<Result<Vec<u8>>>()?;
    let opc = match arg_int(matches, "OPCODE")? {
        Some(opc) => narrow(opc, "opcode")?,
        None => default_opcode(SPMI_CMD_EXT_WRITEL, data.len()),
    };

    pmif.write_cmd(opc, sid, addr, &data)
        .with_context(|| format!("write of sid {sid:#x} addr {addr:#06x} failed"))
}

fn command(pmif: &Pmif, matches: &ArgMatches) -> Result<()> {
    let opc = bus_command(
        matches
            .value_of("COMMAND")
            .expect("expected the required arg COMMAND to exist"),
    )?;
    let sid = narrow(required_int(matches, "SID")?, "sid")?;
    pmif.cmd(opc, sid)
        .with_context(|| format!("bus command {opc:#x} to sid {sid:#x} failed"))
}

fn serve_irqs(pmif: &Pmif, matches: &ArgMatches) -> Result<()> {
    let interval = Duration::from_millis(arg_int(matches, "INTERVAL_MS")?.unwrap_or(10));
    let count = arg_int(matches, "COUNT")?;
    if let Some(mask) = arg_int(matches, "ENABLE")? {
        let mask = narrow(mask, "enable mask")?;
        for bank in IrqBank::ALL {
            pmif.enable_irq_events(bank, mask);
        }
    }

    info!("servicing pmif events every {:?}", interval);
    let mut polls = 0;
    while count.map_or(true, |count| polls < count) {
        if pmif.handle_pending() == IrqReturn::Handled {
            let stats = pmif.irq_stats();
            info!(
                "events: unknown {} spmi records {}",
                stats.unknown(),
                stats.spmi_records()
            );
        }
        polls += 1;
        thread::sleep(interval);
    }
    Ok(())
}

fn main() -> Result<()> {
    let sid = Arg::with_name("SID")
        .takes_value(true)
        .required(true)
        .help("Slave id, 0..=15");
    let addr = Arg::with_name("ADDR")
        .takes_value(true)
        .required(true)
        .help("Register address");
    let opcode = Arg::with_name("OPCODE")
        .long("opcode")
        .takes_value(true)
        .help("Raw SPMI opcode (default: extended long read/write)");

    let matches = App::new(clap::crate_name!())
        .about(clap::crate_description!())
        .version(clap::crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("COMPATIBLE")
                .long("compatible")
                .short("c")
                .takes_value(true)
                .required(true)
                .help("Devicetree compatible string, e.g. mediatek,mt8188-spmi"),
        )
        .arg(
            Arg::with_name("PMIF_BASE")
                .long("pmif-base")
                .takes_value(true)
                .required(true)
                .help("Physical address of the PMIF registers"),
        )
        .arg(
            Arg::with_name("SPMIMST_BASE")
                .long("spmimst-base")
                .takes_value(true)
                .required(true)
                .help("Physical address of the SPMI master registers"),
        )
        .arg(
            Arg::with_name("SOC_CHAN")
                .long("soc-chan")
                .takes_value(true)
                .help("Software interface channel (default from the chip variant)"),
        )
        .arg(
            Arg::with_name("TIMEOUT_US")
                .long("timeout-us")
                .takes_value(true)
                .help("Status poll timeout in microseconds (default 10000)"),
        )
        .subcommand(
            SubCommand::with_name("read")
                .about("Read 1..4 bytes from a PMIC register")
                .arg(sid.clone())
                .arg(addr.clone())
                .arg(
                    Arg::with_name("LEN")
                        .takes_value(true)
                        .required(true)
                        .help("Byte count, 1..=4"),
                )
                .arg(opcode.clone()),
        )
        .subcommand(
            SubCommand::with_name("write")
                .about("Write 1..4 bytes to a PMIC register")
                .arg(sid.clone())
                .arg(addr)
                .arg(
                    Arg::with_name("DATA")
                        .takes_value(true)
                        .multiple(true)
                        .required(true)
                        .help("Bytes to write"),
                )
                .arg(opcode),
        )
        .subcommand(
            SubCommand::with_name("cmd")
                .about("Issue a bus command")
                .arg(
                    Arg::with_name("COMMAND")
                        .takes_value(true)
                        .required(true)
                        .help("reset, sleep, shutdown, wakeup or a raw opcode"),
                )
                .arg(sid),
        )
        .subcommand(
            SubCommand::with_name("irq")
                .about("Poll and handle the interrupt event banks")
                .arg(
                    Arg::with_name("INTERVAL_MS")
                        .long("interval-ms")
                        .takes_value(true)
                        .help("Delay between polls (default 10)"),
                )
                .arg(
                    Arg::with_name("COUNT")
                        .long("count")
                        .takes_value(true)
                        .help("Stop after this many polls"),
                )
                .arg(
                    Arg::with_name("ENABLE")
                        .long("enable")
                        .takes_value(true)
                        .help("Event enable mask written to every bank first"),
                ),
        )
        .get_matches();

    common::setup_logging("spmi", "pmif", common::output_level());

    let pmif = probe(&matches)?;

    match matches.subcommand() {
        ("read", Some(sub)) => read(&pmif, sub),
        ("write", Some(sub)) => write(&pmif, sub),
        ("cmd", Some(sub)) => command(&pmif, sub),
        ("irq", Some(sub)) => serve_irqs(&pmif, sub),
        (other, _) => bail!("unknown subcommand {other:?}"),
    }
}
