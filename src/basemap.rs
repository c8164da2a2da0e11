// Catalog of the base maps the editor can load

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Projection a base map is meant to be viewed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Projection {
    AlbersUsa,
    NaturalEarth,
    Mercator,
    Equirectangular,
    LambertConformalConic,
    AlbersEqualArea,
}

/// Which maps a projection suits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionFamily {
    WorldOnly,
    Cylindrical,
    Conic,
    UsOnly,
}

impl Projection {
    pub const ALL: [Projection; 6] = [
        Projection::AlbersUsa,
        Projection::NaturalEarth,
        Projection::Mercator,
        Projection::Equirectangular,
        Projection::LambertConformalConic,
        Projection::AlbersEqualArea,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Projection::AlbersUsa => "Albers USA",
            Projection::NaturalEarth => "Natural Earth",
            Projection::Mercator => "Mercator",
            Projection::Equirectangular => "Equirectangular",
            Projection::LambertConformalConic => "Lambert Conformal Conic",
            Projection::AlbersEqualArea => "Albers Equal Area",
        }
    }

    pub fn family(self) -> ProjectionFamily {
        match self {
            Projection::AlbersUsa => ProjectionFamily::UsOnly,
            Projection::NaturalEarth => ProjectionFamily::WorldOnly,
            Projection::Mercator | Projection::Equirectangular => ProjectionFamily::Cylindrical,
            Projection::LambertConformalConic | Projection::AlbersEqualArea => {
                ProjectionFamily::Conic
            }
        }
    }

    fn of_families(families: &[ProjectionFamily]) -> Vec<Projection> {
        families
            .iter()
            .flat_map(|family| Projection::ALL.into_iter().filter(move |p| p.family() == *family))
            .collect()
    }
}

/// One selectable base map
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMap {
    pub id: String,
    pub label: String,
    /// Feature properties that can key a value table; the first is the default
    pub data_keys: Vec<&'static str>,
    pub default_projection: Projection,
    pub projection_options: Vec<Projection>,
    pub parallels: Option<[f64; 2]>,
    pub rotate: Option<[f64; 2]>,
}

impl BaseMap {
    fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        data_keys: &[&'static str],
        default_projection: Projection,
        families: &[ProjectionFamily],
    ) -> Self {
        BaseMap {
            id: id.into(),
            label: label.into(),
            data_keys: data_keys.to_vec(),
            default_projection,
            projection_options: Projection::of_families(families),
            parallels: None,
            rotate: None,
        }
    }

    fn conic(mut self, parallels: [f64; 2], rotate: [f64; 2]) -> Self {
        self.parallels = Some(parallels);
        self.rotate = Some(rotate);
        self
    }

    /// Location of the GeoJSON file relative to the maps directory.
    pub fn resource_path(&self) -> String {
        format!("maps/{}.json", self.id)
    }

    /// The GeoJSON file under `root`, where `root` holds the `<id>.json` tree.
    pub fn file_in(&self, root: &Path) -> PathBuf {
        root.join(format!("{}.json", self.id))
    }

    pub fn default_data_key(&self) -> &'static str {
        self.data_keys[0]
    }

    pub fn check_data_key(&self, key: &str) -> Result<()> {
        if !self.data_keys.contains(&key) {
            bail!(
                "Data key '{}' is not available for '{}'. Available keys: {}",
                key,
                self.id,
                self.data_keys.join(", ")
            );
        }
        Ok(())
    }
}

const STATE_FIPS: [(&str, &str); 50] = [
    ("01", "Alabama"),
    ("02", "Alaska"),
    ("04", "Arizona"),
    ("05", "Arkansas"),
    ("06", "California"),
    ("08", "Colorado"),
    ("09", "Connecticut"),
    ("10", "Delaware"),
    ("12", "Florida"),
    ("13", "Georgia"),
    ("15", "Hawaii"),
    ("16", "Idaho"),
    ("17", "Illinois"),
    ("18", "Indiana"),
    ("19", "Iowa"),
    ("20", "Kansas"),
    ("21", "Kentucky"),
    ("22", "Louisiana"),
    ("23", "Maine"),
    ("24", "Maryland"),
    ("25", "Massachusetts"),
    ("26", "Michigan"),
    ("27", "Minnesota"),
    ("28", "Mississippi"),
    ("29", "Missouri"),
    ("30", "Montana"),
    ("31", "Nebraska"),
    ("32", "Nevada"),
    ("33", "New Hampshire"),
    ("34", "New Jersey"),
    ("35", "New Mexico"),
    ("36", "New York"),
    ("37", "North Carolina"),
    ("38", "North Dakota"),
    ("39", "Ohio"),
    ("40", "Oklahoma"),
    ("41", "Oregon"),
    ("42", "Pennsylvania"),
    ("44", "Rhode Island"),
    ("45", "South Carolina"),
    ("46", "South Dakota"),
    ("47", "Tennessee"),
    ("48", "Texas"),
    ("49", "Utah"),
    ("50", "Vermont"),
    ("51", "Virginia"),
    ("53", "Washington"),
    ("54", "West Virginia"),
    ("55", "Wisconsin"),
    ("56", "Wyoming"),
];

const COUNTRY_KEYS: &[&str] = &["NAME", "ISO_A2", "ISO_A3", "REGION_UN", "REGION_WB"];
const US_STATE_KEYS: &[&str] = &["name", "fips", "region"];

/// Every base map, in menu order. The first entry is the default selection.
pub fn catalog() -> Vec<BaseMap> {
    use ProjectionFamily::*;

    let world = [WorldOnly, Cylindrical];
    let regional = [Cylindrical, Conic];
    let us = [UsOnly, Cylindrical];

    let mut maps = vec![
        BaseMap::new(
            "world/ne_110m_admin_0_countries",
            "World - Countries - Natural Earth 110m Cultural Vectors Admin 0",
            COUNTRY_KEYS,
            Projection::NaturalEarth,
            &world,
        ),
        BaseMap::new(
            "world/ne_50m_admin_0_countries",
            "World - Countries - Natural Earth 50m Cultural Vectors Admin 0",
            COUNTRY_KEYS,
            Projection::NaturalEarth,
            &world,
        ),
        BaseMap::new(
            "au/ne_50m_admin_1_states_provinces_lakes_AU",
            "Australia - States - Natural Earth 50m Cultural Vectors Admin 1 States, Provinces",
            &["name"],
            Projection::LambertConformalConic,
            &regional,
        )
        .conic([-18.0, -36.0], [-132.0, 0.0]),
        BaseMap::new(
            "br/ne_50m_admin_1_states_provinces_lakes_BR",
            "Brazil - Natural Earth 50m Cultural Vectors Admin 1 States, Provinces",
            &["name"],
            Projection::AlbersEqualArea,
            &regional,
        )
        .conic([-2.0, -22.0], [54.0, 0.0]),
        BaseMap::new(
            "ca/ne_50m_admin_1_states_provinces_lakes_CA",
            "Canada - Natural Earth 50m Cultural Vectors Admin 1 States, Provinces",
            &["name"],
            Projection::LambertConformalConic,
            &regional,
        )
        .conic([49.0, 77.0], [91.867, 0.0]),
        BaseMap::new(
            "cn/ne_50m_admin_1_states_provinces_lakes_CN",
            "China - Natural Earth 50m Cultural Vectors Admin 1 States, Provinces",
            &["name", "name_local"],
            Projection::Mercator,
            &[Cylindrical],
        ),
        BaseMap::new(
            "us/ne_110m_admin_1_states_provinces_lakes_US",
            "US - States - Natural Earth 110m Cultural Vectors Admin 1",
            US_STATE_KEYS,
            Projection::AlbersUsa,
            &us,
        ),
        BaseMap::new(
            "us/ne_50m_admin_1_states_provinces_lakes_US",
            "US - States - Natural Earth 50m Cultural Vectors Admin 1",
            US_STATE_KEYS,
            Projection::AlbersUsa,
            &us,
        ),
    ];

    maps.extend(STATE_FIPS.iter().map(|(fips, state)| {
        BaseMap::new(
            format!("us/states/cb_2023_us_county_5m_{}_{}", state.to_lowercase(), fips),
            format!(
                "US - {} - County - US Census 2023 Cartographic Boundary - 1 : 5,000,000",
                state
            ),
            &["NAME", "COUNTYFP"],
            Projection::AlbersUsa,
            &us,
        )
    }));

    maps
}

pub fn find(id: &str) -> Option<BaseMap> {
    catalog().into_iter().find(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_default() {
        let maps = catalog();
        assert_eq!(maps.len(), 8 + 50);
        assert_eq!(maps[0].id, "world/ne_110m_admin_0_countries");
        assert_eq!(maps[0].default_data_key(), "NAME");
    }

    #[test]
    fn test_resource_path() {
        let us = find("us/ne_110m_admin_1_states_provinces_lakes_US").unwrap();
        assert_eq!(
            us.resource_path(),
            "maps/us/ne_110m_admin_1_states_provinces_lakes_US.json"
        );
        assert_eq!(
            us.file_in(Path::new("/srv/maps")),
            PathBuf::from("/srv/maps/us/ne_110m_admin_1_states_provinces_lakes_US.json")
        );
    }

    #[test]
    fn test_county_maps() {
        let texas = find("us/states/cb_2023_us_county_5m_texas_48").unwrap();
        assert_eq!(texas.data_keys, vec!["NAME", "COUNTYFP"]);
        assert_eq!(texas.default_projection, Projection::AlbersUsa);
        assert!(texas.label.contains("Texas"));
        assert!(find("us/states/cb_2023_us_county_5m_district of columbia_11").is_none());
    }

    #[test]
    fn test_check_data_key() {
        let china = find("cn/ne_50m_admin_1_states_provinces_lakes_CN").unwrap();
        assert!(china.check_data_key("name_local").is_ok());
        let err = china.check_data_key("NAME").unwrap_err();
        assert!(err.to_string().contains("Available keys: name, name_local"));
    }

    #[test]
    fn test_projection_options() {
        let world = find("world/ne_50m_admin_0_countries").unwrap();
        assert_eq!(
            world.projection_options,
            vec![
                Projection::NaturalEarth,
                Projection::Mercator,
                Projection::Equirectangular
            ]
        );
        let brazil = find("br/ne_50m_admin_1_states_provinces_lakes_BR").unwrap();
        assert_eq!(brazil.parallels, Some([-2.0, -22.0]));
        assert!(brazil.projection_options.contains(&Projection::AlbersEqualArea));
        assert!(!brazil.projection_options.contains(&Projection::AlbersUsa));
    }
}
