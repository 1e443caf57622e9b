//! Two-stage pipeline: producers hand boxed work items to workers through a
//! shared ring buffer, workers hand results to a collector through a second.
//!
//! Run with: `cargo run --example pipeline --features tracing`

use circular_rs::{trace, Backoff, Config, RingBuffer, WaitStrategy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[derive(Debug)]
struct Job {
    id: u64,
    payload: Vec<u8>,
}

fn main() {
    trace::init_tracing();

    const N_PRODUCERS: u64 = 4;
    const N_WORKERS: usize = 2;
    const JOBS_PER_PRODUCER: u64 = 25_000;
    const TOTAL: u64 = N_PRODUCERS * JOBS_PER_PRODUCER;

    // Sized to hold every job, so nothing is overwritten.
    let config = Config::new((TOTAL as usize).next_power_of_two())
        .with_wait(WaitStrategy::Backoff)
        .with_metrics(true);
    let jobs = Arc::new(RingBuffer::<Box<Job>>::with_config(config).unwrap());
    let results = Arc::new(RingBuffer::<Box<(u64, usize)>>::with_config(config).unwrap());
    let stop = Arc::new(AtomicBool::new(false));

    println!("circular-rs pipeline example");
    println!("============================\n");
    println!("  Slots per stage:  {}", config.capacity);
    println!("  Lock-free slots:  {}", RingBuffer::<Box<Job>>::is_lock_free());
    println!("  Producers:        {}", N_PRODUCERS);
    println!("  Workers:          {}", N_WORKERS);
    println!("  Total jobs:       {}\n", TOTAL);

    let start = Instant::now();

    let producers: Vec<_> = (0..N_PRODUCERS)
        .map(|p| {
            let jobs = Arc::clone(&jobs);
            thread::spawn(move || {
                for i in 0..JOBS_PER_PRODUCER {
                    let id = p * JOBS_PER_PRODUCER + i;
                    jobs.push(Box::new(Job {
                        id,
                        payload: vec![(id % 251) as u8; (id % 64) as usize],
                    }));
                }
            })
        })
        .collect();

    let workers: Vec<_> = (0..N_WORKERS)
        .map(|_| {
            let jobs = Arc::clone(&jobs);
            let results = Arc::clone(&results);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut backoff = Backoff::new(WaitStrategy::Backoff);
                while !stop.load(Ordering::Acquire) {
                    match jobs.try_pop() {
                        Ok(job) => {
                            backoff.reset();
                            let sum: usize = job.payload.iter().map(|&b| b as usize).sum();
                            results.push(Box::new((job.id, sum)));
                        }
                        Err(_) => backoff.snooze(),
                    }
                }
            })
        })
        .collect();

    let mut seen = vec![false; TOTAL as usize];
    let mut received = 0u64;
    while received < TOTAL {
        if let Some(result) = results.pop() {
            let (id, _sum) = *result;
            assert!(!seen[id as usize], "job {id} delivered twice");
            seen[id as usize] = true;
            received += 1;
        }
    }

    stop.store(true, Ordering::Release);
    for handle in producers.into_iter().chain(workers) {
        handle.join().unwrap();
    }

    let elapsed = start.elapsed();
    println!("Processed {} jobs in {:?}", received, elapsed);
    println!(
        "Throughput: {:.2} M jobs/sec\n",
        received as f64 / elapsed.as_secs_f64() / 1e6
    );
    println!("Job stage:    {:?}", jobs.metrics());
    println!("Result stage: {:?}", results.metrics());
}
