//! disklabel CLI - list BSD disklabel partitions in disk images

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use disklabel_core::{
    format_size, validate_file_path, Disk, Partition, PartitionHook, PartitionMap,
};
use disklabel_pipeline::{open_image, DiskConfig, ImageDisk};
use disklabel_zones::bsd::{
    entry, read_label, BsdDialect, BsdFsType, LABEL_SECTOR, WHOLE_DISK_PARTITION,
};
use disklabel_zones::mbr::types::MbrPartitionType;
use disklabel_zones::{register_bsd_maps, MbrZoneTable, PartitionMapRegistry};
use serde::Serialize;
use std::ops::ControlFlow;

#[derive(Parser)]
#[command(name = "disklabel")]
#[command(about = "Inspect BSD, NetBSD and OpenBSD disklabels in disk images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, global = true, env = "RUST_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// List the partitions of every disklabel found
    Partitions {
        /// Disk image or block device
        image: String,

        /// Which disklabel dialect to look for
        #[arg(long, value_enum, default_value_t = DialectArg::Auto)]
        dialect: DialectArg,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Read through the file handle instead of memory-mapping
        #[arg(long)]
        no_mmap: bool,

        /// Do not look for labels inside FreeBSD MBR slices
        #[arg(long)]
        no_descend: bool,
    },

    /// Dump the raw label header and entries at a sector
    Label {
        /// Disk image or block device
        image: String,

        /// Sector holding the label
        #[arg(long, default_value_t = LABEL_SECTOR)]
        sector: u64,

        /// Read through the file handle instead of memory-mapping
        #[arg(long)]
        no_mmap: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DialectArg {
    /// Probe every registered map
    Auto,
    Bsd,
    Netbsd,
    Openbsd,
}

impl DialectArg {
    fn dialect(self) -> Option<BsdDialect> {
        match self {
            Self::Auto => None,
            Self::Bsd => Some(BsdDialect::Bsd),
            Self::Netbsd => Some(BsdDialect::NetBsd),
            Self::Openbsd => Some(BsdDialect::OpenBsd),
        }
    }
}

/// One reported partition and the disk it was reported on
#[derive(Debug, Serialize)]
struct Found {
    disk: String,
    name: String,
    fs_type_name: &'static str,
    #[serde(flatten)]
    partition: Partition,
}

impl Found {
    fn new(disk: &dyn Disk, partition: &Partition) -> Self {
        Self {
            disk: disk.name().to_string(),
            name: partition.name(),
            fs_type_name: BsdFsType::from_byte(partition.fs_type).name(),
            partition: partition.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Partitions {
            image,
            dialect,
            json,
            no_mmap,
            no_descend,
        } => {
            let mut disk = open(&image, no_mmap)?;
            let found = collect_partitions(&mut disk, dialect, !no_descend)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                print_partitions(&found);
            }
        }
        Command::Label {
            image,
            sector,
            no_mmap,
        } => {
            let mut disk = open(&image, no_mmap)?;
            dump_label(&mut disk, sector)?;
        }
    }

    Ok(())
}

fn open(image: &str, no_mmap: bool) -> Result<ImageDisk> {
    let path = validate_file_path(image)?;
    let config = DiskConfig { use_mmap: !no_mmap };
    Ok(open_image(&path, &config)?)
}

/// Find labels on the raw disk and, when `descend` is set, inside each
/// FreeBSD slice of its MBR.
fn collect_partitions(
    disk: &mut ImageDisk,
    dialect: DialectArg,
    descend: bool,
) -> Result<Vec<Found>> {
    let mut found = Vec::new();
    let mut record = |disk: &mut dyn Disk, partition: &Partition| {
        found.push(Found::new(disk, partition));
        ControlFlow::Continue(())
    };

    let raw = match dialect.dialect() {
        Some(d) => d.iterate(disk, None, &mut record),
        None => {
            let registry = PartitionMapRegistry::new();
            register_bsd_maps(&registry)?;
            registry.probe(disk, None, &mut record).map(|(kind, flow)| {
                tracing::info!("{}: {} label on the raw disk", disk.name(), kind);
                flow
            })
        }
    };

    let raw_error = match raw {
        Ok(_) => None,
        Err(e) if e.is_bad_partition_table() => {
            tracing::debug!("{}: {}", disk.name(), e);
            Some(e)
        }
        Err(e) => return Err(e.into()),
    };

    let mut descended = false;
    if descend && matches!(dialect, DialectArg::Auto | DialectArg::Bsd) {
        descended = descend_freebsd_slices(disk, &mut record)?;
    }

    drop(record);

    if found.is_empty() {
        if let (Some(e), false, Some(_)) = (raw_error, descended, dialect.dialect()) {
            bail!(e);
        }
    }

    Ok(found)
}

/// Run the `bsd` map inside every FreeBSD slice. Returns true if any slice
/// held a label.
fn descend_freebsd_slices(
    disk: &mut ImageDisk,
    hook: &mut PartitionHook<'_>,
) -> Result<bool> {
    let mbr = match MbrZoneTable::read(disk) {
        Ok(mbr) => mbr,
        Err(e) if e.is_bad_partition_table() => {
            tracing::debug!("{}: no MBR: {}", disk.name(), e);
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    let slices: Vec<_> = mbr.slices_of_type(MbrPartitionType::FreeBsd).copied().collect();
    let mut any = false;

    for slice in slices {
        let parent = slice.parent();
        let name = format!("{},{}", disk.name(), parent.name());
        let mut scoped = disk.scoped(name, parent.start, parent.length)?;

        match BsdDialect::Bsd.iterate(&mut scoped, Some(&parent), &mut *hook) {
            Ok(flow) => {
                any = true;
                if flow.is_break() {
                    break;
                }
            }
            Err(e) if e.is_bad_partition_table() => {
                tracing::debug!("{}: {}", scoped.name(), e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(any)
}

fn print_partitions(found: &[Found]) {
    if found.is_empty() {
        println!("No BSD disklabel found.");
        return;
    }

    println!(
        "{:<28} {:<12} {:<12} {:<12} {:<15}",
        "Partition", "Start", "Sectors", "Size", "Type"
    );
    println!("{}", "-".repeat(80));

    for f in found {
        println!(
            "{:<28} {:<12} {:<12} {:<12} {:<15}",
            format!("{},{}", f.disk, f.name),
            f.partition.start,
            f.partition.length,
            format_size(f.partition.byte_length()),
            f.fs_type_name
        );
    }
}

fn dump_label(disk: &mut ImageDisk, sector: u64) -> Result<()> {
    let label = read_label(disk, sector, false)?;
    let header = &label.header;

    println!("=== Disklabel at sector {} ===", sector);
    println!("Magic:       0x{:08X}", header.magic);
    println!("Magic2:      0x{:08X}", header.magic2);
    println!("Checksum:    0x{:04X}", header.checksum);
    println!("Partitions:  {}", header.num_partitions);
    println!("Boot size:   {}", header.boot_size);
    println!("SB size:     {}", header.superblock_size);
    println!();

    println!(
        "{:<4} {:<12} {:<12} {:<8} {:<6} {:<6} {:<15}",
        "#", "Offset", "Size", "Fsize", "Frag", "Cpg", "Type"
    );
    println!("{}", "-".repeat(70));

    for number in 0..label.num_partitions() {
        let pos = entry::entry_position(sector, number)?;
        let raw = entry::read_entry(disk, pos)?;
        let letter = char::from_u32(u32::from(b'a') + number).unwrap_or('?');

        println!(
            "{:<4} {:<12} {:<12} {:<8} {:<6} {:<6} {:<15}{}",
            letter,
            raw.offset,
            raw.size,
            raw.fragment_size,
            raw.fs_fragments,
            raw.fs_cylinders,
            BsdFsType::from_byte(raw.fs_type),
            if number == WHOLE_DISK_PARTITION { "  (whole disk)" } else { "" }
        );
    }

    Ok(())
}
