pub mod distance;
pub mod extractor;
pub mod normalizer;
pub mod record;
pub mod sequence;

pub use distance::{geodesic_km, total_distance_km};
pub use extractor::{Extraction, SkippedItem, extract_file, extract_points, month_files};
pub use normalizer::{GeoPoint, normalize, parse_timestamp};
pub use record::{RawSubRecord, RecordError};
pub use sequence::LocationSequence;
