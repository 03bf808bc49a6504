//! SVG export.

use tessera_core::vector::VectorOutput;

/// Serializes vector output. The markup is copied verbatim so an exported
/// file re-imports byte for byte.
pub(super) fn encode(vector: &VectorOutput) -> Vec<u8> {
    vector.as_str().as_bytes().to_vec()
}
