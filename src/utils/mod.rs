mod mutation;

pub use mutation::Mutate;
