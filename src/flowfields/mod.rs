//! Flowfields are a means of handling pathfinding for a crowd of actors.
//!
//! [Fixing Pathfinding Once and For All](https://web.archive.org/web/20150905073624/http://www.ai-blog.net/archives/000152.html)
//!
//! [leifnode](https://leifnode.com/2013/12/flow-field-pathfinding/)
//!
//! The world is an unbounded plane of square cells. Cells are stored in
//! Chunks of `16x16`, a Chunk only exists once something asks for it. Each
//! Chunk holds several layers describing its cells and the solved
//! [FlowField](fields::flow_field::FlowField) for them.
//!
//! Definitions:
//!
//! * Chunk - a `16x16` block of cells addressed by a signed `(column, row)` [ChunkID](chunks::ChunkID), rows grow northwards
//!
//! ```text
//!         row +1
//!    ________________
//!   |__|__|__|__|__|
//!   |__|__|__|__|__|   column +1
//!   |__|__|__|__|__|  ---------->
//!   |__|__|__|__|__|
//!  (0,0)
//! ```
//!
//! * Blocked layer - cells agents cannot enter
//! * Target layer - cells agents are trying to reach, any number of targets may exist at once
//! * Movement cost layer - price of stepping onto a cell, [BASE_MOVEMENT_COST](utilities::BASE_MOVEMENT_COST) plus any surcharges
//! * Distance bias layer - extra distance folded into a cell after relaxation, steers agents away from (or towards) areas
//! * Contribution - a registered entity writing a value into one of those layers. Layers are never edited directly, they are rebuilt from their contributions whenever one changes
//! * Flow field - per cell distance to the nearest target and the direction of the neighbour to step onto. It is relaxed a few Jacobi passes per tick so changes ripple outwards over several frames instead of being recomputed in full
//!

pub mod chunks;
pub mod contributions;
pub mod fields;
pub mod solver;
pub mod utilities;
