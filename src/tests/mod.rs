mod evaluation;
mod parsing;
mod simplification;
