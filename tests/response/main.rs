mod block;
mod normalizer;
mod truncate;
