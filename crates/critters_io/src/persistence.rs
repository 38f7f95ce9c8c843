//! Snapshot files, binary population archives and genome export.

use crate::error::{IoError, Result};
use crate::serialization::{from_hex_dna, from_json, to_hex_dna, to_json};
use critters_core::config::AppConfig;
use critters_core::snapshot::{rehydrate_genome, SimulationSnapshot};
use critters_data::{Entity, EntityKind, Genome, PopulationArchive, RoleState};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rkyv::de::deserializers::SharedDeserializeMap;
use rkyv::ser::serializers::AllocSerializer;
use rkyv::ser::Serializer;
use rkyv::{Archive, Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn wants_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Writes a snapshot as JSON, gzip-compressed when the path ends in `.gz`.
pub fn save_snapshot<P: AsRef<Path>>(snapshot: &SimulationSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(snapshot)?;
    let mut file = File::create(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("creating {:?}", path)))?;

    if wants_gzip(path) {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(json.as_bytes())
            .map_err(|e| IoError::compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| IoError::compression(e.to_string()))?;
    } else {
        file.write_all(json.as_bytes())?;
    }
    tracing::debug!(
        path = %path.display(),
        generation = snapshot.generation,
        entities = snapshot.entities.len(),
        "Snapshot saved"
    );
    Ok(())
}

/// Reads a snapshot written by [`save_snapshot`]. Compression is detected
/// from the file contents, not the name.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<SimulationSnapshot> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::not_found(path.display().to_string()));
    }
    let bytes = std::fs::read(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("reading {:?}", path)))?;

    let json = if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoded = String::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut decoded)
            .map_err(|e| IoError::compression(e.to_string()))?;
        decoded
    } else {
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
    };
    from_json(&json).map_err(|e| e.with_context(format!("parsing snapshot {:?}", path)))
}

pub fn save_rkyv<T, P>(data: &T, path: P) -> Result<()>
where
    T: Serialize<AllocSerializer<4096>>,
    T: Archive,
    P: AsRef<Path>,
{
    let mut serializer = AllocSerializer::<4096>::default();
    serializer
        .serialize_value(data)
        .map_err(|e| IoError::archive(format!("serialization failed: {:?}", e)))?;
    let bytes = serializer.into_serializer().into_inner();
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

pub fn load_rkyv<T, P>(path: P) -> Result<T>
where
    T: Archive,
    T::Archived: Deserialize<T, SharedDeserializeMap>
        + for<'a> rkyv::CheckBytes<rkyv::validation::validators::DefaultValidator<'a>>,
    P: AsRef<Path>,
{
    let bytes = std::fs::read(path)?;
    let archived = rkyv::check_archived_root::<T>(&bytes)
        .map_err(|e| IoError::archive(format!("validation failed: {:?}", e)))?;
    let mut deserializer = SharedDeserializeMap::default();
    let deserialized: T = archived
        .deserialize(&mut deserializer)
        .map_err(|e| IoError::archive(format!("deserialization failed: {:?}", e)))?;
    Ok(deserialized)
}

/// Packs living entities into a binary archive record.
pub fn archive_population<'a>(
    generation: u64,
    entities: impl IntoIterator<Item = &'a Entity>,
) -> PopulationArchive {
    PopulationArchive {
        generation,
        timestamp: chrono::Utc::now().to_rfc3339(),
        entities: entities.into_iter().cloned().collect(),
    }
}

/// Unpacks an archive into runnable entities.
///
/// Archives drop controller activations, so every genome is rebuilt
/// against `config`. Role state starts fresh.
pub fn restore_archive(archive: PopulationArchive, config: &AppConfig) -> Result<Vec<Entity>> {
    archive
        .entities
        .into_iter()
        .map(|mut entity| -> Result<Entity> {
            entity.genome = rehydrate_genome(entity.kind, &entity.genome, config)?;
            entity.step_count = 0;
            entity.role_state = RoleState::default();
            Ok(entity)
        })
        .collect()
}

/// HexDNA of one entity's genome.
pub fn export_genome(entity: &Entity) -> Result<String> {
    to_hex_dna(&entity.genome)
}

/// Parses HexDNA and checks it fits `kind` under `config`.
pub fn import_genome(kind: EntityKind, hex_dna: &str, config: &AppConfig) -> Result<Genome> {
    let genome: Genome = from_hex_dna(hex_dna)?;
    Ok(rehydrate_genome(kind, &genome, config)?)
}
