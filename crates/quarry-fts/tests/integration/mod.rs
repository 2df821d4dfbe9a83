mod concurrency;
mod lifecycle;
mod search;
