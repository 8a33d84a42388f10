// Exporters consuming the merged Result Mapping. Both tolerate unpaired
// Q/A entries rather than failing: the document renders placeholders, the
// voice exporter writes whichever file it has text for.

pub mod document;
pub mod voice;
