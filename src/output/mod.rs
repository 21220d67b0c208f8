// Output formatting — terminal display of the topic table.

pub mod terminal;
