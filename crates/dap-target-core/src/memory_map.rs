use crate::target_config::TargetConfig;

const GDB_MEMORY_MAP_HEADER: &str = r#"<?xml version="1.0"?>
<!DOCTYPE memory-map PUBLIC "+//IDN gnu.org//DTD GDB Memory Map V1.0//EN" "http://sourceware.org/gdb/gdb-memory-map.dtd">
<memory-map>
"#;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MemoryKind {
    Flash { blocksize: u32 },
    Ram,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MemoryRegion {
    pub kind: MemoryKind,
    pub start: u32,
    pub length: u32,
}

impl MemoryRegion {
    pub const fn flash(start: u32, end: u32, blocksize: u32) -> Self {
        Self {
            kind: MemoryKind::Flash { blocksize },
            start,
            length: end - start,
        }
    }

    pub const fn ram(start: u32, end: u32) -> Self {
        Self {
            kind: MemoryKind::Ram,
            start,
            length: end - start,
        }
    }

    pub const fn end(&self) -> u32 {
        self.start + self.length
    }
}

/// The memory regions of a target, as reported to a debugger
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MemoryMap {
    pub regions: Vec<MemoryRegion>,
}

impl MemoryMap {
    pub fn from_config(cfg: &TargetConfig) -> Self {
        Self {
            regions: vec![
                MemoryRegion::flash(cfg.flash_start, cfg.flash_end, cfg.sector_size),
                MemoryRegion::ram(cfg.ram_start, cfg.ram_end),
            ],
        }
    }

    pub fn flash_regions(&self) -> impl Iterator<Item = &MemoryRegion> {
        self.regions
            .iter()
            .filter(|region| matches!(region.kind, MemoryKind::Flash { .. }))
    }

    pub fn ram_regions(&self) -> impl Iterator<Item = &MemoryRegion> {
        self.regions
            .iter()
            .filter(|region| region.kind == MemoryKind::Ram)
    }

    /// Renders the map as a GDB memory-map document
    pub fn to_gdb_xml(&self) -> String {
        let mut xml = String::from(GDB_MEMORY_MAP_HEADER);

        for region in &self.regions {
            let line = match region.kind {
                MemoryKind::Flash { blocksize } => format!(
                    r#"    <memory type="flash" start="{:#x}" length="{:#x}"> <property name="blocksize">{:#x}</property></memory>"#,
                    region.start, region.length, blocksize
                ),
                MemoryKind::Ram => format!(
                    r#"    <memory type="ram" start="{:#x}" length="{:#x}"> </memory>"#,
                    region.start, region.length
                ),
            };
            xml.push_str(&line);
            xml.push('\n');
        }

        xml.push_str("</memory-map>\n");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::atsam4e::ATSAM4E_HOME_GATEWAY;

    #[test]
    fn derived_from_config() {
        let map = MemoryMap::from_config(&ATSAM4E_HOME_GATEWAY);
        assert_eq!(
            map.regions,
            vec![
                MemoryRegion {
                    kind: MemoryKind::Flash { blocksize: 0x2000 },
                    start: 0x0040_0000,
                    length: 0x0010_0000,
                },
                MemoryRegion {
                    kind: MemoryKind::Ram,
                    start: 0x2000_0000,
                    length: 0x0002_0000,
                },
            ]
        );
        assert_eq!(map.regions[0].end(), ATSAM4E_HOME_GATEWAY.flash_end);
    }

    #[test]
    fn gdb_xml() {
        let xml = MemoryMap::from_config(&ATSAM4E_HOME_GATEWAY).to_gdb_xml();
        let expected = r#"<?xml version="1.0"?>
<!DOCTYPE memory-map PUBLIC "+//IDN gnu.org//DTD GDB Memory Map V1.0//EN" "http://sourceware.org/gdb/gdb-memory-map.dtd">
<memory-map>
    <memory type="flash" start="0x400000" length="0x100000"> <property name="blocksize">0x2000</property></memory>
    <memory type="ram" start="0x20000000" length="0x20000"> </memory>
</memory-map>
"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn empty_map() {
        let xml = MemoryMap::default().to_gdb_xml();
        assert!(xml.ends_with("<memory-map>\n</memory-map>\n"));
    }
}
