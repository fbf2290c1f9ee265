pub mod encoding;

pub use encoding::{decode_hkey, decode_index_key, encode_hkey, encode_index_key, encode_tuple, prefix_len, prefix_successor};
