use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::location::LatLng;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(RollId);
id_newtype!(FrameId);
id_newtype!(CameraId);
id_newtype!(LensId);
id_newtype!(FilmStockId);
id_newtype!(FilterId);

/// Enums persisted as plain integers. Unknown values fall back to the
/// default variant instead of failing.
macro_rules! value_enum {
    ($name:ident, default = $default:ident, { $($variant:ident = $value:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn value(self) -> i32 {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            pub fn from_value(value: i32) -> Self {
                match value {
                    $($value => Self::$variant,)+
                    _ => Self::$default,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

value_enum!(Format, default = Mm35, {
    Mm35 = 0,
    Mm120 = 1,
    Mm127 = 2,
    Mm620 = 3,
    Inch4x5 = 4,
    Inch8x10 = 5,
});

value_enum!(Increment, default = Third, {
    Third = 0,
    Half = 1,
    Full = 2,
});

value_enum!(PartialIncrement, default = Third, {
    Third = 0,
    Half = 1,
});

value_enum!(FilmType, default = Unknown, {
    Unknown = 0,
    BwNegative = 1,
    BwReversal = 2,
    ColorNegative = 3,
    SlideReversal = 4,
    Other = 5,
});

value_enum!(FilmProcess, default = Unknown, {
    Unknown = 0,
    BwNegative = 1,
    BwReversal = 2,
    C41 = 3,
    E6 = 4,
    Ecn2 = 5,
    Other = 6,
});

value_enum!(LightSource, default = Unknown, {
    Unknown = 0,
    Daylight = 1,
    Sunny = 2,
    Cloudy = 3,
    Shade = 4,
    Fluorescent = 5,
    Tungsten = 6,
    Flash = 7,
});

value_enum!(RollFilterMode, default = Active, {
    Active = 0,
    Archived = 1,
    All = 2,
});

value_enum!(RollSortMode, default = Date, {
    Date = 0,
    Name = 1,
    Camera = 2,
});

value_enum!(FrameSortMode, default = FrameCount, {
    FrameCount = 0,
    Date = 1,
    FStop = 2,
    ShutterSpeed = 3,
    Lens = 4,
});

value_enum!(FilmStockSortMode, default = Name, {
    Name = 0,
    Iso = 1,
});

value_enum!(FilmStockFilterMode, default = All, {
    All = 0,
    Preadded = 1,
    UserAdded = 2,
});

impl RollFilterMode {
    pub fn matches(self, roll: &Roll) -> bool {
        match self {
            Self::Active => !roll.archived,
            Self::Archived => roll.archived,
            Self::All => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: CameraId,
    pub make: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub min_shutter: Option<String>,
    pub max_shutter: Option<String>,
    pub shutter_increments: Increment,
    pub exposure_comp_increments: PartialIncrement,
    pub format: Format,
}

impl Camera {
    pub fn name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    pub id: LensId,
    pub make: String,
    pub model: String,
    pub serial_number: Option<String>,
    pub min_aperture: Option<String>,
    pub max_aperture: Option<String>,
    pub min_focal_length: i32,
    pub max_focal_length: i32,
    pub aperture_increments: Increment,
}

impl Lens {
    pub fn name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: FilterId,
    pub make: String,
    pub model: String,
}

impl Filter {
    pub fn name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmStock {
    pub id: FilmStockId,
    pub make: String,
    pub model: String,
    pub iso: i32,
    pub film_type: FilmType,
    pub process: FilmProcess,
    pub is_preadded: bool,
}

impl FilmStock {
    pub fn name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

/// One roll of film and its metadata. `archived` is a soft-delete flag:
/// archived rolls stay in the store and are only hidden by the active
/// filter mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roll {
    pub id: RollId,
    pub name: String,
    pub date: NaiveDateTime,
    pub unloaded: Option<NaiveDateTime>,
    pub developed: Option<NaiveDateTime>,
    pub note: Option<String>,
    pub camera: Option<Camera>,
    pub film_stock: Option<FilmStock>,
    pub iso: i32,
    pub push_pull: Option<String>,
    pub format: Format,
    pub archived: bool,
}

impl Roll {
    pub fn new(name: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            id: RollId(0),
            name: name.into(),
            date,
            unloaded: None,
            developed: None,
            note: None,
            camera: None,
            film_stock: None,
            iso: 0,
            push_pull: None,
            format: Format::default(),
            archived: false,
        }
    }
}

/// One exposure within a roll. Shutter and aperture are kept as the strings
/// the user entered ("1/125", "2.8"); comparators parse them on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    pub roll_id: RollId,
    pub count: i32,
    pub date: NaiveDateTime,
    pub shutter: Option<String>,
    pub aperture: Option<String>,
    pub focal_length: i32,
    pub exposure_comp: Option<String>,
    pub no_of_exposures: i32,
    pub flash_used: bool,
    pub light_source: LightSource,
    pub note: Option<String>,
    pub location: Option<LatLng>,
    pub formatted_address: Option<String>,
    pub lens: Option<Lens>,
    pub filters: Vec<Filter>,
}

impl Frame {
    pub fn new(roll_id: RollId, count: i32, date: NaiveDateTime) -> Self {
        Self {
            id: FrameId(0),
            roll_id,
            count,
            date,
            shutter: None,
            aperture: None,
            focal_length: 0,
            exposure_comp: None,
            no_of_exposures: 1,
            flash_used: false,
            light_source: LightSource::Unknown,
            note: None,
            location: None,
            formatted_address: None,
            lens: None,
            filters: Vec::new(),
        }
    }
}
