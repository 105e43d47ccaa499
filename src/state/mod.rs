mod persistence;

pub use persistence::{
    catalog_entries, load_bounds, load_catalog, load_profiles, profiles_from_value, save_json,
};
