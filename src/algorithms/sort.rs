use std::cmp::Ordering;

/// Sorts `items` by `key`, ascending unless `reverse` is set.
///
/// Three-way partition around the middle element: each pass buckets the
/// chunk into `less`, `equal`, and `greater`, and every bucket keeps the
/// original relative order, so the sort is stable. Average O(n log n); the
/// fixed middle-element pivot degrades to O(n²) on adversarial input, which
/// is accepted for this workload. Pending partitions live on an explicit
/// work stack rather than the call stack, so depth is bounded by memory,
/// not by recursion. Keys compare via `partial_cmp`; incomparable keys
/// (NaN) land in the `equal` bucket.
pub fn sort_by_key<T, K, F>(items: Vec<T>, key: F, reverse: bool) -> Vec<T>
where
    F: Fn(&T) -> K,
    K: PartialOrd,
{
    enum Chunk<T> {
        Unsorted(Vec<T>),
        Sorted(Vec<T>),
    }

    let mut out = Vec::with_capacity(items.len());
    let mut stack = vec![Chunk::Unsorted(items)];

    while let Some(chunk) = stack.pop() {
        let chunk = match chunk {
            Chunk::Sorted(sorted) => {
                out.extend(sorted);
                continue;
            }
            Chunk::Unsorted(chunk) => chunk,
        };
        if chunk.len() <= 1 {
            out.extend(chunk);
            continue;
        }

        let pivot_key = key(&chunk[chunk.len() / 2]);
        let mut less = Vec::new();
        let mut equal = Vec::new();
        let mut greater = Vec::new();
        for item in chunk {
            let ord = key(&item)
                .partial_cmp(&pivot_key)
                .unwrap_or(Ordering::Equal);
            let ord = if reverse { ord.reverse() } else { ord };
            match ord {
                Ordering::Less => less.push(item),
                Ordering::Equal => equal.push(item),
                Ordering::Greater => greater.push(item),
            }
        }

        // Output order is less, equal, greater; the stack pops in reverse.
        stack.push(Chunk::Unsorted(greater));
        stack.push(Chunk::Sorted(equal));
        stack.push(Chunk::Unsorted(less));
    }

    out
}
