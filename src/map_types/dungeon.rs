use crate::{
    error::{DungeonError, LayoutDataError},
    floor::{BlockPalette, Floor, FloorBuilder, FloorRole},
    maze::{MazeGenerator, MazeParams},
    random::LegacyRandom,
    sampling::{FloorSize, SizeTable},
    BlockEncoder,
};

use serde::{Deserialize, Serialize};

/// Odd, so distinct floor indices always give distinct seeds.
pub const FLOOR_SEED_STRIDE: u32 = 0x9E37_79B9;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FloorSeedMode {
    /// `base_seed ^ floor_index * FLOOR_SEED_STRIDE`; the first floor uses the base seed as is.
    PerFloor,
    /// Every floor uses the base seed.
    Shared,
}

impl Default for FloorSeedMode {
    fn default() -> Self {
        FloorSeedMode::PerFloor
    }
}

/// Part of the reproducibility contract; never change the mixing.
pub fn derive_floor_seed(base_seed: u32, floor_index: usize, mode: FloorSeedMode) -> u32 {
    match mode {
        FloorSeedMode::PerFloor => base_seed ^ (floor_index as u32).wrapping_mul(FLOOR_SEED_STRIDE),
        FloorSeedMode::Shared => base_seed,
    }
}

/// Everything a dungeon type contributes to generation, resolved up front by the caller.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DungeonDefinition {
    pub floor_count: usize,
    pub sizes: SizeTable,
    #[serde(default)]
    pub maze: MazeParams,
    #[serde(default)]
    pub palette: BlockPalette,
    #[serde(default)]
    pub seed_mode: FloorSeedMode,
}

impl DungeonDefinition {
    pub fn new(floor_count: usize, size: FloorSize) -> Self {
        DungeonDefinition {
            floor_count,
            sizes: SizeTable::uniform(size),
            maze: MazeParams::default(),
            palette: BlockPalette::default(),
            seed_mode: FloorSeedMode::default(),
        }
    }

    pub fn from_ron(text: &str) -> Result<Self, DungeonError> {
        Ok(ron::from_str(text)?)
    }

    pub fn generate(&self, name: &str, base_seed: u32) -> Result<Dungeon, DungeonError> {
        DungeonGenerator::new(self).generate(name, base_seed, self.floor_count, &self.sizes)
    }
}

/// One generation request as it arrives from the world layer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DungeonInstance {
    pub name: String,
    pub seed: u32,
    /// Passed through untouched for the world layer.
    #[serde(default)]
    pub option: Option<String>,
}

impl DungeonInstance {
    pub fn new(name: impl Into<String>, seed: u32) -> Self {
        DungeonInstance {
            name: name.into(),
            seed,
            option: None,
        }
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn generate(&self, definition: &DungeonDefinition) -> Result<Dungeon, DungeonError> {
        let mut dungeon = definition.generate(&self.name, self.seed)?;
        dungeon.option = self.option.clone();

        Ok(dungeon)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "DungeonRecord")]
pub struct Dungeon {
    name: String,
    seed: u32,
    option: Option<String>,
    floors: Vec<Floor>,
}

// Floors check themselves while being read; only their order is left.
#[derive(Deserialize)]
struct DungeonRecord {
    name: String,
    seed: u32,
    option: Option<String>,
    floors: Vec<Floor>,
}

impl TryFrom<DungeonRecord> for Dungeon {
    type Error = LayoutDataError;

    fn try_from(record: DungeonRecord) -> Result<Self, Self::Error> {
        if record.floors.is_empty() {
            return Err(LayoutDataError::NoFloors);
        }
        for (position, floor) in record.floors.iter().enumerate() {
            if floor.index() != position {
                return Err(LayoutDataError::FloorOrder {
                    position,
                    index: floor.index(),
                });
            }
        }

        Ok(Dungeon {
            name: record.name,
            seed: record.seed,
            option: record.option,
            floors: record.floors,
        })
    }
}

impl Dungeon {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn option(&self) -> Option<&str> {
        self.option.as_deref()
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floor(&self, index: usize) -> Option<&Floor> {
        self.floors.get(index)
    }

    pub fn encode(&self, encoder: &mut impl BlockEncoder) {
        for floor in self.floors.iter() {
            floor.encode(encoder);
        }
    }

    /// Concatenated floor encodings; the instance name and option are not part of the layout.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.seed.to_le_bytes());
        bytes.extend((self.floors.len() as u32).to_le_bytes());
        for floor in self.floors.iter() {
            bytes.extend(floor.canonical_bytes());
        }

        bytes
    }
}

pub struct DungeonGenerator<'a> {
    definition: &'a DungeonDefinition,
}

impl<'a> DungeonGenerator<'a> {
    pub fn new(definition: &'a DungeonDefinition) -> Self {
        DungeonGenerator { definition }
    }

    /// Generates `floor_count` floors, each from its own stream. The first failing floor aborts
    /// the whole dungeon.
    ///
    /// Only the maze parameters, palette and seed mode come from the definition. `floor_count`
    /// and `sizes` are taken as given, so one definition can drive dungeons of other depths;
    /// [`DungeonDefinition::generate`] passes the definition's own.
    pub fn generate(
        &self,
        name: &str,
        base_seed: u32,
        floor_count: usize,
        sizes: &SizeTable,
    ) -> Result<Dungeon, DungeonError> {
        if floor_count == 0 {
            return Err(DungeonError::NoFloors);
        }
        if sizes.is_empty() {
            return Err(DungeonError::EmptySizeTable);
        }
        if let Some(range) = sizes.first_invalid_range() {
            return Err(DungeonError::InvalidSizeRange(range));
        }

        log::debug!(
            "Generating dungeon '{}' from seed {} with {} floors",
            name,
            base_seed,
            floor_count
        );

        let maze = MazeGenerator::new(self.definition.maze.clone());
        let builder = FloorBuilder::new(&self.definition.palette);

        let mut floors = Vec::with_capacity(floor_count);
        for floor_index in 0..floor_count {
            let seed = derive_floor_seed(base_seed, floor_index, self.definition.seed_mode);
            let mut rng = LegacyRandom::new(seed);

            let size = sizes
                .for_floor(floor_index)
                .expect("Size table was checked to be non-empty");
            let (width, height) = size.sample(&mut rng);
            log::debug!(
                "Floor {} of '{}': seed {}, {}x{}",
                floor_index,
                name,
                seed,
                width,
                height
            );

            let layout = maze
                .generate(&mut rng, width, height)
                .map_err(|source| DungeonError::Floor {
                    name: name.to_string(),
                    floor_index,
                    source,
                })?;
            let role = FloorRole {
                index: floor_index,
                is_last: floor_index + 1 == floor_count,
            };
            floors.push(builder.build(&layout, role, &mut rng));
        }

        Ok(Dungeon {
            name: name.to_string(),
            seed: base_seed,
            option: None,
            floors,
        })
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
